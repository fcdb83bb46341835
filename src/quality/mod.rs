//! Data quality checks for raw OHLCV frames
//!
//! Provides:
//! - Schema, null-rate and type validation
//! - Value range and temporal ordering checks
//! - JSON and text quality reports

mod checker;
mod report;

pub use checker::{QualityChecker, QualityConfig, DEFAULT_MIN_ROWS};
pub use report::{Check, QualityReport};
