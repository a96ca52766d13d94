//! Window checks that confirm edge and surface candidates.

use nalgebra::Vector3;

/// Whether a high-curvature point at `ind` is a real edge.
///
/// Looks at the consecutive gaps in `[ind - region, ind + region]`. Without
/// any gap above `max_sq_gap` the curvature comes from smooth geometry (a
/// corner) and the point is accepted. With gaps, the point must occlude
/// something: at least one point in front of a gap has to be farther from
/// the sensor than the candidate. Otherwise the candidate is the far side
/// of an occlusion and its curvature is an artifact.
pub fn can_be_edge(positions: &[Vector3<f64>], ind: usize, region: usize, max_sq_gap: f64) -> bool {
    debug_assert!(ind >= region && ind + region < positions.len());

    let depth = positions[ind].norm();
    let mut found_gap = false;

    for m in ind - region..ind + region {
        if (positions[m] - positions[m + 1]).norm_squared() > max_sq_gap {
            if positions[m].norm() > depth {
                return true;
            }
            found_gap = true;
        }
    }

    !found_gap
}

/// Whether any point in `[ind - region, ind + region]` lies farther than
/// `sqrt(max_sq_dist)` from the point at `ind`.
pub fn has_gap(positions: &[Vector3<f64>], ind: usize, region: usize, max_sq_dist: f64) -> bool {
    debug_assert!(ind >= region && ind + region < positions.len());

    let center = positions[ind];
    positions[ind - region..=ind + region]
        .iter()
        .any(|p| (p - center).norm_squared() > max_sq_dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(n: usize, range: f64) -> Vec<Vector3<f64>> {
        (0..n)
            .map(|i| Vector3::new(range, (i as f64 - 10.0) * 0.1, 0.0))
            .collect()
    }

    #[test]
    fn test_smooth_window_is_edge() {
        let points = wall(21, 10.0);
        assert!(can_be_edge(&points, 10, 5, 0.2));
    }

    #[test]
    fn test_occluding_edge_accepted() {
        // Candidate at 10 is the first point of a near wall; the point in
        // front of the gap is on the background
        let mut points = wall(21, 10.0);
        for p in points.iter_mut().take(10) {
            p.x = 15.0;
        }
        assert!(can_be_edge(&points, 10, 5, 0.2));
    }

    #[test]
    fn test_gap_after_candidate_rejected() {
        // Only the point in front of each gap is compared, which here is
        // the candidate itself
        let mut points = wall(21, 10.0);
        for p in points.iter_mut().skip(11) {
            p.x = 15.0;
        }
        assert!(!can_be_edge(&points, 10, 5, 0.2));
    }

    #[test]
    fn test_occluded_point_rejected() {
        // Candidate at 10 is on the background right behind a near object;
        // the only point before a gap is nearer than the candidate
        let mut points = wall(21, 15.0);
        for p in points.iter_mut().take(10) {
            p.x = 10.0;
        }
        assert!(!can_be_edge(&points, 10, 5, 0.2));
    }

    #[test]
    fn test_gap_outside_window_ignored() {
        let mut points = wall(30, 10.0);
        for p in points.iter_mut().skip(16) {
            p.x = 5.0;
        }
        // Window of 10 is [5, 15], gap sits between 15 and 16
        assert!(can_be_edge(&points, 10, 5, 0.2));
        assert!(!has_gap(&points, 10, 5, 0.3));
    }

    #[test]
    fn test_has_gap() {
        let points = wall(21, 10.0);
        // Farthest neighbor is 0.5 away: 0.25 <= 0.3
        assert!(!has_gap(&points, 10, 5, 0.3));

        let mut points = points;
        points[14].z = 1.0;
        assert!(has_gap(&points, 10, 5, 0.3));
    }
}
