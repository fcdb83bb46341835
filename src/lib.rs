//! stockvol - Data quality and feature engineering for volatility prediction
//!
//! This crate provides the algorithmic core of a stock volatility MLOps
//! pipeline:
//! - Data quality checks over raw OHLCV time series
//! - Leakage-free feature engineering with forward-looking targets
//! - The feature-list contract shared by training and serving
//!
//! # Modules
//!
//! ## Data
//! - [`frame`] - Time-indexed frame and CSV/Parquet I/O
//! - [`synthetic`] - Seeded random-walk OHLCV generation
//!
//! ## Core
//! - [`quality`] - Quality checks and reports
//! - [`timeseries`] - Rolling windows, EWM and calendar primitives
//! - [`features`] - Feature transformer, feature spec and feature frame
//! - [`drift`] - Feature baselines and the serving drift ratio
//!
//! ## Pipeline
//! - [`config`] - Pipeline configuration
//! - [`pipeline`] - Check, gate, transform and persist
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod frame;
pub mod synthetic;

// Core
pub mod quality;
pub mod timeseries;
pub mod features;
pub mod drift;

// Pipeline
pub mod config;
pub mod pipeline;
pub mod cli;

pub use error::{Result, StockVolError};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::{GateMode, PipelineConfig};
    pub use crate::drift::FeatureBaseline;
    pub use crate::error::{Result, StockVolError};
    pub use crate::features::{
        FeatureConfig, FeatureFrame, FeatureSpec, FeatureTransformer, MissingFeaturePolicy,
    };
    pub use crate::frame::{Column, TimeIndex, TimeSeriesFrame};
    pub use crate::pipeline::{Pipeline, PipelineOutput};
    pub use crate::quality::{Check, QualityChecker, QualityConfig, QualityReport};
    pub use crate::synthetic::SyntheticOhlcv;
}
