//! Training-time feature statistics and the serving drift ratio

use crate::error::{Result, StockVolError};
use crate::features::{FeatureFrame, FeatureSpec};
use crate::timeseries::{window_stat, RollingStat};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Number of standard deviations beyond which a live value counts as drifted
pub const DRIFT_SIGMA: f64 = 3.0;

/// Summary statistics for one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureStats {
    /// Compute statistics from data
    pub fn from_data(data: &Array1<f64>) -> Self {
        let values = data.to_vec();
        let std = window_stat(&values, RollingStat::Std);
        Self {
            mean: window_stat(&values, RollingStat::Mean),
            std: if std.is_nan() { 0.0 } else { std },
            min: window_stat(&values, RollingStat::Min),
            max: window_stat(&values, RollingStat::Max),
        }
    }

    /// Whether `value` lies more than [`DRIFT_SIGMA`] deviations from the mean
    pub fn is_outlier(&self, value: f64) -> bool {
        (value - self.mean).abs() > DRIFT_SIGMA * self.std
    }
}

/// Per-feature statistics captured from a training feature frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureBaseline {
    features: BTreeMap<String, FeatureStats>,
}

impl FeatureBaseline {
    /// Statistics for every feature in `spec`; the frame must have rows
    pub fn fit(features: &FeatureFrame, spec: &FeatureSpec) -> Result<Self> {
        if features.height() == 0 {
            return Err(StockVolError::DataError(
                "Cannot fit a baseline on an empty feature frame".to_string(),
            ));
        }

        let mut stats = BTreeMap::new();
        for name in spec.names() {
            let column = features.column(name)?;
            stats.insert(name.clone(), FeatureStats::from_data(&column));
        }
        debug!(features = stats.len(), rows = features.height(), "Fitted feature baseline");
        Ok(Self { features: stats })
    }

    pub fn get(&self, name: &str) -> Option<&FeatureStats> {
        self.features.get(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Fraction of features in a spec-ordered vector that fall outside the
    /// baseline's 3-sigma band; 0 for an empty spec
    pub fn drift_ratio(&self, vector: &Array1<f64>, spec: &FeatureSpec) -> Result<f64> {
        if vector.len() != spec.len() {
            return Err(StockVolError::ShapeError {
                expected: format!("{} features", spec.len()),
                actual: format!("{} features", vector.len()),
            });
        }
        if spec.is_empty() {
            return Ok(0.0);
        }

        let mut drifted = 0usize;
        for (name, &value) in spec.names().iter().zip(vector.iter()) {
            let stats = self
                .get(name)
                .ok_or_else(|| StockVolError::FeatureNotFound(name.clone()))?;
            if stats.is_outlier(value) {
                drifted += 1;
            }
        }

        Ok(drifted as f64 / spec.len() as f64)
    }

    /// Write the baseline as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
