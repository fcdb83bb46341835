//! Feature drift monitoring
//!
//! Captures per-feature statistics at training time so a serving process
//! can score how far a live feature vector sits from the training data.

mod baseline;

pub use baseline::{FeatureBaseline, FeatureStats, DRIFT_SIGMA};
