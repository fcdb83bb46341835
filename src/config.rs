//! Pipeline configuration
//!
//! Loaded from a JSON file (every field optional) and then overridden from
//! the environment: `STOCK_SYMBOL` and `PROCESSED_DATA_PATH`.

use crate::error::{Result, StockVolError};
use crate::features::FeatureConfig;
use crate::quality::{QualityConfig, DEFAULT_MIN_ROWS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a failed quality check does to a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Abort the run
    #[default]
    Fatal,
    /// Log the failure and continue
    Advisory,
}

/// Configuration for a check, transform and persist run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ticker used in output file names
    pub symbol: String,
    pub quality: QualityConfig,
    pub features: FeatureConfig,
    /// Prediction horizon in bars
    pub horizon: usize,
    /// Minimum rows for the sufficient-data check
    pub min_rows: usize,
    pub gate: GateMode,
    /// Directory processed outputs are written to
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            quality: QualityConfig::default(),
            features: FeatureConfig::default(),
            horizon: 1,
            min_rows: DEFAULT_MIN_ROWS,
            gate: GateMode::Fatal,
            output_dir: PathBuf::from("./data/processed"),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            StockVolError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    /// Apply `STOCK_SYMBOL` and `PROCESSED_DATA_PATH` from the process
    /// environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("STOCK_SYMBOL").filter(|s| !s.is_empty()) {
            self.symbol = symbol;
        }
        if let Some(dir) = lookup("PROCESSED_DATA_PATH").filter(|s| !s.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Builder method to set the symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Builder method to set the horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Builder method to set the minimum row count
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Builder method to set the gate mode
    pub fn with_gate(mut self, gate: GateMode) -> Self {
        self.gate = gate;
        self
    }

    /// Builder method to set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }
}
