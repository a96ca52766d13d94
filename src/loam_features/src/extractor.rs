//! Keypoint selection.
//!
//! # Example
//!
//! ```ignore
//! use loam_features::{FeatureConfig, FeatureExtractor, RingBounds};
//!
//! let extractor = FeatureExtractor::new(FeatureConfig::default())?;
//! let bounds = RingBounds::new(scan_start, scan_end)?;
//!
//! let keypoints = extractor.extract(&points, &bounds)?;
//! println!("{} sharp, {} flat", keypoints.sharp.len(), keypoints.flat.len());
//! ```

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::classify::{can_be_edge, has_gap};
use crate::config::FeatureConfig;
use crate::curvature::compute_curvatures;
use crate::error::Result;
use crate::reliability::mark_unreliable;
use crate::scratch::{RingScratch, ScanScratch};
use crate::suppression::mark_as_picked;
use crate::types::{FeatureExtraction, KeypointIndices, KeypointSets, Label, RingBounds, ScanPoint};

/// Extract keypoints with the default configuration.
///
/// `scan_start[i]..=scan_end[i]` is the index range of ring `i` in `points`.
pub fn extract_features<P: ScanPoint>(
    points: &[P],
    scan_start: &[usize],
    scan_end: &[usize],
) -> Result<KeypointSets<P>> {
    let bounds = RingBounds::new(scan_start.to_vec(), scan_end.to_vec())?;
    FeatureExtractor::default().extract(points, &bounds)
}

/// Edge and surface keypoint extractor.
///
/// Stateless between calls: every extraction allocates its own scratch
/// buffers, so one extractor can serve several threads.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

/// What one ring contributed.
struct RingOutcome {
    keypoints: KeypointIndices,
    unreliable: usize,
    selected: bool,
}

impl FeatureExtractor {
    /// Create an extractor, rejecting invalid configurations.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract the four keypoint sets of a scan.
    pub fn extract<P: ScanPoint>(
        &self,
        points: &[P],
        bounds: &RingBounds,
    ) -> Result<KeypointSets<P>> {
        let extraction = self.extract_indices(points, bounds)?;
        Ok(extraction.keypoints.gather(points))
    }

    /// Extract keypoints as indices, along with the per-point state.
    ///
    /// Fails without doing any work if `bounds` does not describe `points`.
    pub fn extract_indices<P: ScanPoint>(
        &self,
        points: &[P],
        bounds: &RingBounds,
    ) -> Result<FeatureExtraction> {
        bounds.validate(points.len())?;

        let positions: Vec<Vector3<f64>> = points.par_iter().map(ScanPoint::position).collect();
        let curvatures = compute_curvatures(&positions, self.config.features_region);

        let mut scratch = ScanScratch::new(points.len());
        let outcomes: Vec<RingOutcome> = {
            let views = scratch.ring_views(bounds)?;
            let process = |(ring_index, view): (usize, RingScratch<'_>)| {
                self.process_ring(ring_index, &positions, &curvatures, view)
            };
            if self.config.parallel_rings {
                views.into_par_iter().enumerate().map(process).collect()
            } else {
                views.into_iter().enumerate().map(process).collect()
            }
        };

        let mut keypoints = KeypointIndices::default();
        let mut rings_processed = 0;
        let mut unreliable_count = 0;
        for mut outcome in outcomes {
            keypoints.append(&mut outcome.keypoints);
            unreliable_count += outcome.unreliable;
            if outcome.selected {
                rings_processed += 1;
            }
        }
        let rings_skipped = bounds.len() - rings_processed;

        debug!(
            points = points.len(),
            rings = bounds.len(),
            rings_skipped,
            unreliable = unreliable_count,
            sharp = keypoints.sharp.len(),
            less_sharp = keypoints.less_sharp.len(),
            flat = keypoints.flat.len(),
            less_flat = keypoints.less_flat.len(),
            "Extracted scan features"
        );

        let (picked, labels) = scratch.into_parts();
        Ok(FeatureExtraction {
            keypoints,
            curvatures,
            picked,
            labels,
            rings_processed,
            rings_skipped,
            unreliable_count,
        })
    }

    /// Filter one ring, then select keypoints segment by segment.
    fn process_ring(
        &self,
        ring_index: usize,
        positions: &[Vector3<f64>],
        curvatures: &[f64],
        mut ring: RingScratch<'_>,
    ) -> RingOutcome {
        let config = &self.config;
        let unreliable = mark_unreliable(positions, config, &mut ring);
        let mut keypoints = KeypointIndices::default();

        // Usable interior keeps every window of radius R inside the ring
        let range = ring.range();
        let s = range.start + config.features_region;
        let e = range.end.checked_sub(config.features_region + 1);
        let Some(e) = e.filter(|&e| e >= s && e - s >= config.n_segments) else {
            trace!(
                ring = ring_index,
                points = range.point_count(),
                "Ring too short for feature selection"
            );
            return RingOutcome {
                keypoints,
                unreliable,
                selected: false,
            };
        };

        let n = config.n_segments;
        for j in 0..n {
            let sp = s + (e - s) * j / n;
            let ep = s + (e - s) * (j + 1) / n - 1;
            if ep + 1 - sp < n {
                continue;
            }
            self.select_segment(
                ring_index,
                sp,
                ep,
                positions,
                curvatures,
                &mut ring,
                &mut keypoints,
            );
        }

        RingOutcome {
            keypoints,
            unreliable,
            selected: true,
        }
    }

    /// Run the sharp, flat and surface-candidate passes over `[sp, ep]`.
    #[allow(clippy::too_many_arguments)]
    fn select_segment(
        &self,
        ring_index: usize,
        sp: usize,
        ep: usize,
        positions: &[Vector3<f64>],
        curvatures: &[f64],
        ring: &mut RingScratch<'_>,
        keypoints: &mut KeypointIndices,
    ) {
        let config = &self.config;
        let r = config.features_region;

        let mut sorted: Vec<usize> = (sp..=ep).collect();
        sorted.sort_by(|&a, &b| curvatures[a].total_cmp(&curvatures[b]));

        if ring_index >= config.min_sharp_ring {
            let mut largest_picked = 0;
            for &ind in sorted.iter().rev() {
                if largest_picked >= config.picked_num_less_sharp {
                    break;
                }
                let curvature = curvatures[ind];
                if curvature <= config.sharp_curvature_threshold {
                    break;
                }
                if curvature.is_nan()
                    || ring.is_picked(ind)
                    || !can_be_edge(positions, ind, r, config.edge_gap_sq_dist)
                {
                    continue;
                }

                largest_picked += 1;
                if largest_picked <= config.picked_num_sharp {
                    keypoints.sharp.push(ind);
                    ring.set_label(ind, Label::Sharp);
                } else {
                    ring.set_label(ind, Label::LessSharp);
                }
                keypoints.less_sharp.push(ind);

                mark_as_picked(positions, ring, ind, r, config.suppression_sq_dist);
            }
        }

        if ring_index >= config.min_flat_ring {
            let mut smallest_picked = 0;
            for &ind in &sorted {
                if smallest_picked >= config.picked_num_flat {
                    break;
                }
                let curvature = curvatures[ind];
                if curvature >= config.surface_curvature_threshold {
                    break;
                }
                if curvature.is_nan() || ring.is_picked(ind) {
                    continue;
                }

                smallest_picked += 1;
                keypoints.flat.push(ind);
                ring.set_label(ind, Label::Flat);

                mark_as_picked(positions, ring, ind, r, config.suppression_sq_dist);
            }
        }

        // Surface candidates ignore the picked mask and have no cap
        for ind in sp..=ep {
            let label = ring.label(ind);
            if label.is_surface_eligible()
                && curvatures[ind] < config.surface_curvature_threshold
                && !has_gap(positions, ind, r, config.gap_sq_dist)
            {
                if label == Label::Unset {
                    ring.set_label(ind, Label::SurfaceCandidate);
                }
                keypoints.less_flat.push(ind);
            }
        }
    }
}
