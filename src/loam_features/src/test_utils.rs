//! Synthetic ring scans for testing feature extraction.
//!
//! Each generator produces one ring in acquisition order; [`stack_rings`]
//! concatenates rings into a flat scan with its ring index table.

use crate::error::Result;
use crate::types::RingBounds;

/// A straight wall at distance `range` in front of the sensor.
///
/// Points run along +y with `spacing` between neighbors, centered on the
/// x axis, at height `z`.
pub fn make_wall_ring(num_points: usize, range: f32, spacing: f32, z: f32) -> Vec<[f32; 3]> {
    let half = (num_points / 2) as f32;
    (0..num_points)
        .map(|k| [range, (k as f32 - half) * spacing, z])
        .collect()
}

/// A convex 90° corner pointing at the sensor.
///
/// The vertex sits at `(range, 0, z)` and is point `vertex` of the ring.
/// Both arms leave it at 45° to the x axis, away from the sensor, with
/// `spacing` between neighbors.
pub fn make_corner_ring(
    num_points: usize,
    vertex: usize,
    range: f32,
    spacing: f32,
    z: f32,
) -> Vec<[f32; 3]> {
    let step = spacing / std::f32::consts::SQRT_2;
    (0..num_points)
        .map(|k| {
            if k < vertex {
                let l = (vertex - k) as f32;
                [range + l * step, -l * step, z]
            } else {
                let l = (k - vertex) as f32;
                [range + l * step, l * step, z]
            }
        })
        .collect()
}

/// A wall with a single point lifted by `height` along z.
pub fn make_spike_ring(
    num_points: usize,
    spike: usize,
    range: f32,
    spacing: f32,
    height: f32,
) -> Vec<[f32; 3]> {
    let mut ring = make_wall_ring(num_points, range, spacing, 0.0);
    ring[spike][2] += height;
    ring
}

/// Concatenate rings into a flat scan and its ring index table.
///
/// Fails on an empty ring.
pub fn stack_rings<P: Clone>(rings: &[Vec<P>]) -> Result<(Vec<P>, RingBounds)> {
    let lengths: Vec<usize> = rings.iter().map(Vec::len).collect();
    let bounds = RingBounds::from_ring_lengths(&lengths)?;
    let points = rings.iter().flatten().cloned().collect();
    Ok((points, bounds))
}

/// A stack of parallel walls, one per ring, 0.05m apart in height.
pub fn make_wall_scan(
    num_rings: usize,
    points_per_ring: usize,
    range: f32,
    spacing: f32,
) -> Result<(Vec<[f32; 3]>, RingBounds)> {
    let rings: Vec<_> = (0..num_rings)
        .map(|i| make_wall_ring(points_per_ring, range, spacing, i as f32 * 0.05))
        .collect();
    stack_rings(&rings)
}
