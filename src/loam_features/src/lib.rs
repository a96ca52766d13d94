//! LOAM-style keypoint extraction for rotating LiDAR scans.
//!
//! Reduces a ring-ordered scan to a few hundred points that are cheap and
//! stable to match between frames: edge points on corners and occluding
//! boundaries, and surface points on flat patches.
//!
//! # Pipeline
//!
//! - Curvature: smoothness score per point from a window of `2R + 1` points
//! - Reliability: drop points next to grazing surfaces and isolated outliers
//! - Selection: per ring and angular segment, greedily pick sharp and flat
//!   points, suppressing the neighbors of every accepted point
//!
//! # Usage
//!
//! ```ignore
//! use loam_features::extract_features;
//!
//! // points: ring-ordered [x, y, z] returns of one sweep
//! let keypoints = extract_features(&points, &scan_start, &scan_end)?;
//! println!(
//!     "sharp: {}, less sharp: {}, flat: {}, less flat: {}",
//!     keypoints.sharp.len(),
//!     keypoints.less_sharp.len(),
//!     keypoints.flat.len(),
//!     keypoints.less_flat.len()
//! );
//! ```

pub mod classify;
pub mod config;
pub mod curvature;
pub mod error;
pub mod extractor;
pub mod reliability;
pub mod scratch;
pub mod suppression;
pub mod test_utils;
pub mod types;

pub use config::{FeatureConfig, FeatureConfigBuilder};
pub use error::{FeatureError, Result};
pub use extractor::{extract_features, FeatureExtractor};
pub use types::{
    FeatureExtraction, KeypointIndices, KeypointSets, Label, LidarPoint, RingBounds, RingRange,
    ScanPoint,
};
