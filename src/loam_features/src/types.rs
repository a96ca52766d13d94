//! Scan and keypoint types.

use nalgebra::Vector3;

use crate::error::{FeatureError, Result};

/// A point of a ring-ordered LiDAR scan.
///
/// Only the coordinates are read. Everything else (intensity, ring id,
/// timestamps) travels with the point into the keypoint sets unchanged.
pub trait ScanPoint: Clone + Send + Sync {
    /// Cartesian coordinates in the sensor frame.
    fn xyz(&self) -> [f32; 3];

    /// Coordinates as an `f64` vector, the precision the extractor works in.
    fn position(&self) -> Vector3<f64> {
        let [x, y, z] = self.xyz();
        Vector3::new(x as f64, y as f64, z as f64)
    }
}

impl ScanPoint for [f32; 3] {
    fn xyz(&self) -> [f32; 3] {
        *self
    }
}

/// `[x, y, z, intensity]`
impl ScanPoint for [f32; 4] {
    fn xyz(&self) -> [f32; 3] {
        [self[0], self[1], self[2]]
    }
}

/// A LiDAR return with its beam index and intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidarPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
    pub ring: u16,
}

impl ScanPoint for LidarPoint {
    fn xyz(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Inclusive index range of one ring in the flat point array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingRange {
    pub start: usize,
    pub end: usize,
}

impl RingRange {
    /// Number of points in the ring.
    pub fn point_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether `index` lies inside the ring.
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Ring index table: `scan_start[i]..=scan_end[i]` is ring `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBounds {
    scan_start: Vec<usize>,
    scan_end: Vec<usize>,
}

impl RingBounds {
    /// Build a ring table, checking only that both sequences pair up.
    ///
    /// Range checks against a point array happen in [`RingBounds::validate`].
    pub fn new(scan_start: Vec<usize>, scan_end: Vec<usize>) -> Result<Self> {
        if scan_start.len() != scan_end.len() {
            return Err(FeatureError::MismatchedBounds {
                starts: scan_start.len(),
                ends: scan_end.len(),
            });
        }
        Ok(Self {
            scan_start,
            scan_end,
        })
    }

    /// Build a ring table from consecutive ring lengths.
    ///
    /// Zero-length rings are not representable in an inclusive table and
    /// are rejected.
    pub fn from_ring_lengths(lengths: &[usize]) -> Result<Self> {
        let mut scan_start = Vec::with_capacity(lengths.len());
        let mut scan_end = Vec::with_capacity(lengths.len());
        let mut offset = 0usize;

        for (ring, &len) in lengths.iter().enumerate() {
            if len == 0 {
                return Err(FeatureError::ZeroLengthRing { ring });
            }
            scan_start.push(offset);
            scan_end.push(offset + len - 1);
            offset += len;
        }

        Ok(Self {
            scan_start,
            scan_end,
        })
    }

    pub fn scan_start(&self) -> &[usize] {
        &self.scan_start
    }

    pub fn scan_end(&self) -> &[usize] {
        &self.scan_end
    }

    /// Number of rings.
    pub fn len(&self) -> usize {
        self.scan_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scan_start.is_empty()
    }

    /// Range of ring `ring`.
    pub fn ring(&self, ring: usize) -> RingRange {
        RingRange {
            start: self.scan_start[ring],
            end: self.scan_end[ring],
        }
    }

    /// Iterate `(ring_index, range)` in ring order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, RingRange)> + '_ {
        self.scan_start
            .iter()
            .zip(&self.scan_end)
            .map(|(&start, &end)| RingRange { start, end })
            .enumerate()
    }

    /// Check the table against a point array of `num_points` points.
    ///
    /// Ranges must be in bounds, non-inverted, increasing and disjoint.
    pub fn validate(&self, num_points: usize) -> Result<()> {
        let mut previous_end: Option<usize> = None;

        for (ring, range) in self.iter() {
            if range.start > range.end {
                return Err(FeatureError::InvertedRing {
                    ring,
                    start: range.start,
                    end: range.end,
                });
            }
            if range.end >= num_points {
                return Err(FeatureError::RingOutOfRange {
                    ring,
                    start: range.start,
                    end: range.end,
                    num_points,
                });
            }
            if let Some(previous_end) = previous_end {
                if range.start <= previous_end {
                    return Err(FeatureError::OverlappingRings {
                        ring,
                        previous_end,
                        start: range.start,
                    });
                }
            }
            previous_end = Some(range.end);
        }

        Ok(())
    }
}

/// Per-point classification, assigned at most once per extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    #[default]
    Unset,
    /// Accepted into the less-flat set without being a flat keypoint.
    SurfaceCandidate,
    Flat,
    LessSharp,
    Sharp,
}

impl Label {
    /// Unset or flat: the labels the surface-candidate pass may still collect.
    pub fn is_surface_eligible(self) -> bool {
        matches!(self, Label::Unset | Label::Flat)
    }

    /// Sharp or less-sharp.
    pub fn is_edge(self) -> bool {
        matches!(self, Label::Sharp | Label::LessSharp)
    }
}

/// Keypoint sets as indices into the input point array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeypointIndices {
    pub sharp: Vec<usize>,
    pub less_sharp: Vec<usize>,
    pub flat: Vec<usize>,
    pub less_flat: Vec<usize>,
}

impl KeypointIndices {
    /// Append another set, keeping order.
    pub fn append(&mut self, other: &mut KeypointIndices) {
        self.sharp.append(&mut other.sharp);
        self.less_sharp.append(&mut other.less_sharp);
        self.flat.append(&mut other.flat);
        self.less_flat.append(&mut other.less_flat);
    }

    /// Total number of indices over all four sets.
    pub fn total(&self) -> usize {
        self.sharp.len() + self.less_sharp.len() + self.flat.len() + self.less_flat.len()
    }

    /// Gather the points behind these indices.
    pub fn gather<P: ScanPoint>(&self, points: &[P]) -> KeypointSets<P> {
        let pick =
            |indices: &[usize]| -> Vec<P> { indices.iter().map(|&i| points[i].clone()).collect() };
        KeypointSets {
            sharp: pick(&self.sharp),
            less_sharp: pick(&self.less_sharp),
            flat: pick(&self.flat),
            less_flat: pick(&self.less_flat),
        }
    }
}

/// The four keypoint sets of one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointSets<P> {
    /// Strongest edge points (subset of `less_sharp`).
    pub sharp: Vec<P>,
    /// Edge points.
    pub less_sharp: Vec<P>,
    /// Strongest surface points.
    pub flat: Vec<P>,
    /// Downsampled surface points.
    pub less_flat: Vec<P>,
}

/// Full result of one extraction, for callers that need more than points.
#[derive(Debug, Clone)]
pub struct FeatureExtraction {
    /// Selected keypoints as indices.
    pub keypoints: KeypointIndices,
    /// Curvature per input point.
    pub curvatures: Vec<f64>,
    /// Final picked mask.
    pub picked: Vec<bool>,
    /// Final labels.
    pub labels: Vec<Label>,
    /// Rings that went through selection.
    pub rings_processed: usize,
    /// Rings too short for selection.
    pub rings_skipped: usize,
    /// Points excluded by the reliability filter.
    pub unreliable_count: usize,
}
