//! Neighbor suppression around accepted keypoints.

use nalgebra::Vector3;

use crate::scratch::RingScratch;

/// Mark `ind` and its contiguous neighbors as picked.
///
/// Walks outward up to `region` points on each side and stops at the first
/// consecutive gap whose squared length exceeds `max_sq_gap`, so suppression
/// never crosses a break in the surface. Reads and writes stay within
/// `[ind - region, ind + region]`, which the caller keeps inside the ring.
pub fn mark_as_picked(
    positions: &[Vector3<f64>],
    ring: &mut RingScratch<'_>,
    ind: usize,
    region: usize,
    max_sq_gap: f64,
) {
    let range = ring.range();
    debug_assert!(ind >= range.start + region && ind + region <= range.end);

    ring.pick(ind);

    for l in 1..=region {
        if (positions[ind + l] - positions[ind + l - 1]).norm_squared() > max_sq_gap {
            break;
        }
        ring.pick(ind + l);
    }

    for l in 1..=region {
        if (positions[ind - l] - positions[ind - l + 1]).norm_squared() > max_sq_gap {
            break;
        }
        ring.pick(ind - l);
    }
}
