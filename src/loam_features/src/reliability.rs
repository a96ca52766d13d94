//! Reliability filter.
//!
//! Marks points whose curvature comes from the sensor rather than from the
//! scene: points next to a surface seen at a grazing angle, and isolated
//! range outliers. Marked points are picked before selection starts, so
//! they never become keypoints.

use nalgebra::Vector3;

use crate::config::FeatureConfig;
use crate::scratch::RingScratch;

/// Mark unreliable points of one ring as picked.
///
/// Considers `j` in `[start + R + 1, end - R - 1]` and compares each point
/// with its successor. Rings with fewer than `n_segments` points between
/// the margins are left untouched.
///
/// # Returns
/// Number of points newly marked.
pub fn mark_unreliable(
    positions: &[Vector3<f64>],
    config: &FeatureConfig,
    ring: &mut RingScratch<'_>,
) -> usize {
    let r = config.features_region;
    let range = ring.range();
    let sp = range.start + r;
    let Some(ep) = range.end.checked_sub(r) else {
        return 0;
    };
    if ep < sp || ep - sp < config.n_segments {
        return 0;
    }

    let before = ring.picked_count();

    for j in sp + 1..ep {
        let point = positions[j];
        let next_point = positions[j + 1];

        let diff_next = (point - next_point).norm_squared();
        if diff_next <= config.discontinuity_sq_dist {
            continue;
        }

        let depth1 = point.norm();
        let depth2 = next_point.norm();

        if depth1 > depth2 {
            // Current point is the far one: only the far side is dropped
            if beam_parallel_residual(&next_point, depth2, &point, depth1)
                < config.parallel_beam_ratio
            {
                ring.pick_range(j - r, j);
                continue;
            }
        } else if beam_parallel_residual(&point, depth1, &next_point, depth2)
            < config.parallel_beam_ratio
        {
            ring.pick_range(j - r, j + r);
            continue;
        }

        let diff_prev = (point - positions[j - 1]).norm_squared();
        let dis = point.norm_squared();
        let limit = config.outlier_range_ratio * dis;
        if diff_next > limit && diff_prev > limit {
            ring.pick(j);
        }
    }

    ring.picked_count() - before
}

/// Distance between the near point and the far point pulled onto the near
/// range, relative to the near range. Small values mean both returns lie on
/// nearly the same beam direction.
fn beam_parallel_residual(
    near: &Vector3<f64>,
    near_depth: f64,
    far: &Vector3<f64>,
    far_depth: f64,
) -> f64 {
    (near - far * (near_depth / far_depth)).norm() / near_depth
}
