//! Configuration for LOAM feature extraction.
//!
//! Every threshold of the selection algorithm lives here. Defaults match
//! the reference LOAM parameters for a 64-beam rotating LiDAR.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// Configuration for feature extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of angular segments each ring is split into.
    pub n_segments: usize,

    /// Sharp points kept per segment.
    pub picked_num_sharp: usize,

    /// Less-sharp points kept per segment, sharp points included.
    pub picked_num_less_sharp: usize,

    /// Flat points kept per segment.
    pub picked_num_flat: usize,

    /// Curvature below which a point counts as surface.
    pub surface_curvature_threshold: f64,

    /// Neighborhood radius R (points on each side) for curvature and
    /// all window operations. The curvature stencil is `2R + 1` wide.
    pub features_region: usize,

    /// Curvature above which a point is an edge candidate.
    pub sharp_curvature_threshold: f64,

    /// Squared distance between consecutive points that counts as a
    /// depth discontinuity in the reliability filter.
    pub discontinuity_sq_dist: f64,

    /// Range-normalized residual below which a discontinuity is explained
    /// by a surface nearly parallel to the laser beam.
    pub parallel_beam_ratio: f64,

    /// Fraction of the squared range that both neighbor gaps must exceed
    /// for a point to be dropped as an isolated outlier.
    pub outlier_range_ratio: f64,

    /// Squared distance from the center above which a window has a gap.
    pub gap_sq_dist: f64,

    /// Squared consecutive distance marking an occlusion edge around an
    /// edge candidate.
    pub edge_gap_sq_dist: f64,

    /// Squared consecutive distance that stops neighbor suppression.
    pub suppression_sq_dist: f64,

    /// Rings with a lower index never produce sharp or less-sharp points.
    ///
    /// On a 64-beam sensor this skips the lower, ground-facing beams.
    pub min_sharp_ring: usize,

    /// Rings with a lower index never produce flat points.
    pub min_flat_ring: usize,

    /// Process rings on the rayon thread pool.
    ///
    /// Output is identical either way.
    pub parallel_rings: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_segments: 6,
            picked_num_sharp: 4,
            picked_num_less_sharp: 20,
            picked_num_flat: 4,
            surface_curvature_threshold: 0.1,
            features_region: 5,
            sharp_curvature_threshold: 0.5,
            discontinuity_sq_dist: 0.1,
            parallel_beam_ratio: 0.1,
            outlier_range_ratio: 0.0002,
            gap_sq_dist: 0.3,
            edge_gap_sq_dist: 0.2,
            suppression_sq_dist: 0.05,
            min_sharp_ring: 45,
            min_flat_ring: 50,
            parallel_rings: true,
        }
    }
}

impl FeatureConfig {
    /// Configuration that lets every ring produce every keypoint class.
    ///
    /// Useful for sensors whose beam layout differs from the 64-beam
    /// default, and for single-ring scans.
    pub fn all_rings() -> Self {
        Self {
            min_sharp_ring: 0,
            min_flat_ring: 0,
            ..Default::default()
        }
    }

    /// Check that the configuration describes a usable extractor.
    pub fn validate(&self) -> Result<()> {
        if self.features_region == 0 {
            return Err(FeatureError::InvalidConfig(
                "features_region must be at least 1".into(),
            ));
        }
        if self.n_segments == 0 {
            return Err(FeatureError::InvalidConfig(
                "n_segments must be at least 1".into(),
            ));
        }
        if self.picked_num_sharp > self.picked_num_less_sharp {
            return Err(FeatureError::InvalidConfig(format!(
                "picked_num_sharp ({}) exceeds picked_num_less_sharp ({})",
                self.picked_num_sharp, self.picked_num_less_sharp
            )));
        }

        let thresholds = [
            ("surface_curvature_threshold", self.surface_curvature_threshold),
            ("sharp_curvature_threshold", self.sharp_curvature_threshold),
            ("discontinuity_sq_dist", self.discontinuity_sq_dist),
            ("parallel_beam_ratio", self.parallel_beam_ratio),
            ("outlier_range_ratio", self.outlier_range_ratio),
            ("gap_sq_dist", self.gap_sq_dist),
            ("edge_gap_sq_dist", self.edge_gap_sq_dist),
            ("suppression_sq_dist", self.suppression_sq_dist),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(FeatureError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Curvature stencil weights, `2R + 1` entries with `-2R` at the center.
    pub fn curvature_stencil(&self) -> Vec<f64> {
        let r = self.features_region;
        let mut coef = vec![1.0; 2 * r + 1];
        coef[r] = -2.0 * r as f64;
        coef
    }
}

/// Builder for [`FeatureConfig`].
#[derive(Debug, Clone, Default)]
pub struct FeatureConfigBuilder {
    config: FeatureConfig,
}

impl FeatureConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of segments per ring.
    pub fn n_segments(mut self, n_segments: usize) -> Self {
        self.config.n_segments = n_segments;
        self
    }

    /// Set the per-segment caps for sharp, less-sharp and flat points.
    pub fn picked_caps(mut self, sharp: usize, less_sharp: usize, flat: usize) -> Self {
        self.config.picked_num_sharp = sharp;
        self.config.picked_num_less_sharp = less_sharp;
        self.config.picked_num_flat = flat;
        self
    }

    /// Set the neighborhood radius.
    pub fn features_region(mut self, features_region: usize) -> Self {
        self.config.features_region = features_region;
        self
    }

    /// Set the surface curvature threshold.
    pub fn surface_curvature_threshold(mut self, threshold: f64) -> Self {
        self.config.surface_curvature_threshold = threshold;
        self
    }

    /// Set the edge curvature threshold.
    pub fn sharp_curvature_threshold(mut self, threshold: f64) -> Self {
        self.config.sharp_curvature_threshold = threshold;
        self
    }

    /// Set the lowest ring indices allowed to produce sharp and flat points.
    pub fn ring_guards(mut self, min_sharp_ring: usize, min_flat_ring: usize) -> Self {
        self.config.min_sharp_ring = min_sharp_ring;
        self.config.min_flat_ring = min_flat_ring;
        self
    }

    /// Enable or disable parallel ring processing.
    pub fn parallel_rings(mut self, parallel: bool) -> Self {
        self.config.parallel_rings = parallel;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<FeatureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.n_segments, 6);
        assert_eq!(config.picked_num_sharp, 4);
        assert_eq!(config.picked_num_less_sharp, 20);
        assert_eq!(config.picked_num_flat, 4);
        assert_eq!(config.features_region, 5);
        assert_eq!(config.min_sharp_ring, 45);
        assert_eq!(config.min_flat_ring, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_stencil() {
        let config = FeatureConfig::default();
        assert_eq!(
            config.curvature_stencil(),
            vec![1.0, 1.0, 1.0, 1.0, 1.0, -10.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_builder() {
        let config = FeatureConfigBuilder::new()
            .n_segments(4)
            .picked_caps(2, 10, 3)
            .ring_guards(0, 0)
            .parallel_rings(false)
            .build()
            .unwrap();

        assert_eq!(config.n_segments, 4);
        assert_eq!(config.picked_num_sharp, 2);
        assert_eq!(config.picked_num_less_sharp, 10);
        assert_eq!(config.picked_num_flat, 3);
        assert_eq!(config.min_sharp_ring, 0);
        assert!(!config.parallel_rings);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(FeatureConfigBuilder::new().n_segments(0).build().is_err());
        assert!(FeatureConfigBuilder::new().features_region(0).build().is_err());
        assert!(FeatureConfigBuilder::new()
            .picked_caps(8, 4, 4)
            .build()
            .is_err());

        let config = FeatureConfig {
            gap_sq_dist: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_config() {
        let config: FeatureConfig =
            serde_json::from_str(r#"{ "min_sharp_ring": 10, "picked_num_flat": 2 }"#).unwrap();

        assert_eq!(config.min_sharp_ring, 10);
        assert_eq!(config.picked_num_flat, 2);
        assert_eq!(config.n_segments, 6);
        assert_eq!(config.surface_curvature_threshold, 0.1);
    }
}
