//! Error types for feature extraction.

use thiserror::Error;

/// Errors from feature extraction.
///
/// Every bounds variant means the caller handed in a ring index table that
/// does not describe the point array. The call is rejected before any work
/// is done, so there is never partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("scan_start has {starts} entries but scan_end has {ends}")]
    MismatchedBounds { starts: usize, ends: usize },

    #[error("ring {ring} range [{start}, {end}] exceeds point count {num_points}")]
    RingOutOfRange {
        ring: usize,
        start: usize,
        end: usize,
        num_points: usize,
    },

    #[error("ring {ring} starts after it ends ({start} > {end})")]
    InvertedRing { ring: usize, start: usize, end: usize },

    #[error("ring {ring} starts at {start}, overlapping previous ring ending at {previous_end}")]
    OverlappingRings {
        ring: usize,
        previous_end: usize,
        start: usize,
    },

    #[error("ring {ring} has no points")]
    ZeroLengthRing { ring: usize },

    #[error("invalid feature configuration: {0}")]
    InvalidConfig(String),
}

impl FeatureError {
    /// Whether this error is a ring bounds precondition violation.
    pub fn is_invalid_bounds(&self) -> bool {
        !matches!(self, FeatureError::InvalidConfig(_))
    }
}

/// Result alias for feature extraction.
pub type Result<T> = std::result::Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_classification() {
        let err = FeatureError::MismatchedBounds { starts: 2, ends: 3 };
        assert!(err.is_invalid_bounds());

        let err = FeatureError::InvalidConfig("zero segments".into());
        assert!(!err.is_invalid_bounds());
    }

    #[test]
    fn test_error_messages() {
        let err = FeatureError::OverlappingRings {
            ring: 3,
            previous_end: 120,
            start: 100,
        };
        assert_eq!(
            err.to_string(),
            "ring 3 starts at 100, overlapping previous ring ending at 120"
        );
    }
}
