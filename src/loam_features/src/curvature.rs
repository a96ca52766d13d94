//! Per-point curvature (smoothness) estimation.
//!
//! Each axis is convolved with the stencil `[1, .., 1, -2R, 1, .., 1]`
//! of width `2R + 1`. The squared norm of the result is divided by
//! `10 * |p|` so near and far points are comparable.

use nalgebra::Vector3;
use rayon::prelude::*;

/// Range normalization factor applied to every curvature value.
pub const CURVATURE_NORMALIZATION: f64 = 10.0;

/// Compute the curvature of every point.
///
/// Only points with a full window inside the whole array get a value; the
/// first and last `region` points are zero. Windows may cross ring
/// boundaries here, which is why selection keeps a margin of `region`
/// points at both ends of each ring.
///
/// # Arguments
/// * `positions` - Ring-ordered point coordinates
/// * `region` - Window radius R
///
/// # Returns
/// One curvature per point, same length as `positions`.
pub fn compute_curvatures(positions: &[Vector3<f64>], region: usize) -> Vec<f64> {
    let n = positions.len();
    if region == 0 || n < 2 * region + 1 {
        return vec![0.0; n];
    }

    (0..n)
        .into_par_iter()
        .map(|center| {
            if center < region || center + region >= n {
                0.0
            } else {
                point_curvature(positions, center, region)
            }
        })
        .collect()
}

/// Curvature of a single point with a full window.
///
/// A point at the sensor origin has no scale; the division then follows
/// IEEE rules (infinity, or NaN for an all-zero window).
pub fn point_curvature(positions: &[Vector3<f64>], center: usize, region: usize) -> f64 {
    debug_assert!(center >= region && center + region < positions.len());

    let window = &positions[center - region..=center + region];
    let neighbor_sum: Vector3<f64> = window.iter().sum::<Vector3<f64>>() - positions[center];
    let diff = neighbor_sum - positions[center] * (2 * region) as f64;

    diff.norm_squared() / (positions[center].norm() * CURVATURE_NORMALIZATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize, spacing: f64) -> Vec<Vector3<f64>> {
        (0..n)
            .map(|i| Vector3::new(10.0, (i as f64 - n as f64 / 2.0) * spacing, 0.0))
            .collect()
    }

    #[test]
    fn test_short_input_is_all_zero() {
        let points = line(10, 0.1);
        assert_eq!(compute_curvatures(&points, 5), vec![0.0; 10]);
        assert!(compute_curvatures(&[], 5).is_empty());
    }

    #[test]
    fn test_margins_are_zero() {
        let points = line(30, 0.1);
        let curvatures = compute_curvatures(&points, 5);
        assert_eq!(curvatures.len(), 30);
        for &c in curvatures[..5].iter().chain(&curvatures[25..]) {
            assert_eq!(c, 0.0);
        }
    }

    #[test]
    fn test_evenly_spaced_line_is_smooth() {
        let points = line(50, 0.05);
        let curvatures = compute_curvatures(&points, 5);
        for &c in &curvatures {
            assert!(c.abs() < 1e-12, "curvature {c} on a straight line");
        }
    }

    #[test]
    fn test_matches_stencil_definition() {
        // Stencil [1,1,1,1,1,-10,1,1,1,1,1] applied by hand to one axis
        let mut points = line(11, 0.1);
        points[5].z = 2.0;

        let stencil = [1.0, 1.0, 1.0, 1.0, 1.0, -10.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let mut diff = Vector3::zeros();
        for (w, p) in stencil.iter().zip(&points) {
            diff += p * *w;
        }
        let expected = diff.norm_squared() / (points[5].norm() * 10.0);

        let curvatures = compute_curvatures(&points, 5);
        assert_relative_eq!(curvatures[5], expected, epsilon = 1e-12);
        // z contributes -20, the x and y stencils cancel
        assert_relative_eq!(curvatures[5], 400.0 / (points[5].norm() * 10.0), epsilon = 1e-9);
    }

    #[test]
    fn test_spike_raises_only_its_window() {
        let mut points = line(200, 0.05);
        points[100].z += 5.0;

        let curvatures = compute_curvatures(&points, 5);
        for (i, &c) in curvatures.iter().enumerate() {
            if (95..=105).contains(&i) {
                assert!(c > 0.1, "curvature at {i} should be raised, got {c}");
            } else {
                assert!(c < 1e-9, "curvature at {i} should be near zero, got {c}");
            }
        }

        let max_index = (0..200)
            .max_by(|&a, &b| curvatures[a].total_cmp(&curvatures[b]))
            .unwrap();
        assert_eq!(max_index, 100);
    }

    #[test]
    fn test_range_normalization() {
        // Same geometry twice as far away: the stencil output is unchanged
        // while the range doubles
        let mut near = line(11, 0.1);
        near[5].z = 1.0;
        let mut far: Vec<_> = near.iter().map(|p| p + Vector3::new(10.0, 0.0, 0.0)).collect();
        far[5].z = 1.0;

        let c_near = compute_curvatures(&near, 5)[5];
        let c_far = compute_curvatures(&far, 5)[5];
        assert_relative_eq!(c_near / c_far, far[5].norm() / near[5].norm(), epsilon = 1e-9);
    }
}
