//! Ordered feature list shared by training and serving

use crate::error::{Result, StockVolError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// What to do when a live feature vector lacks some features
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MissingFeaturePolicy {
    /// Fail with the list of missing features
    #[default]
    Reject,
    /// Substitute a constant and log the substitution
    Fill(f64),
}

/// Derived feature names in the order the model consumes them.
///
/// Serializes as a bare JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSpec {
    names: Vec<String>,
}

impl FeatureSpec {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Write the feature list as a JSON array
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a spec written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Build one inference row in spec order
    pub fn assemble(
        &self,
        values: &HashMap<String, f64>,
        policy: MissingFeaturePolicy,
    ) -> Result<Array1<f64>> {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !values.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            match policy {
                MissingFeaturePolicy::Reject => {
                    return Err(StockVolError::MissingFeatures(missing));
                }
                MissingFeaturePolicy::Fill(fill) => {
                    warn!(
                        count = missing.len(),
                        fill,
                        features = %missing.join(", "),
                        "Filling missing live features"
                    );
                }
            }
        }

        let fill = match policy {
            MissingFeaturePolicy::Fill(v) => v,
            MissingFeaturePolicy::Reject => f64::NAN,
        };

        Ok(self
            .names
            .iter()
            .map(|name| values.get(name).copied().unwrap_or(fill))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> FeatureSpec {
        FeatureSpec::new(vec!["rsi".into(), "returns".into(), "volatility_5".into()])
    }

    #[test]
    fn test_json_is_a_bare_array() {
        let json = serde_json::to_string(&spec()).unwrap();
        assert_eq!(json, r#"["rsi","returns","volatility_5"]"#);
    }

    #[test]
    fn test_assemble_orders_by_spec() {
        let values: HashMap<String, f64> = [
            ("volatility_5".to_string(), 0.3),
            ("rsi".to_string(), 55.0),
            ("returns".to_string(), 0.01),
            ("unused".to_string(), 9.0),
        ]
        .into_iter()
        .collect();

        let row = spec().assemble(&values, MissingFeaturePolicy::Reject).unwrap();
        assert_eq!(row.to_vec(), vec![55.0, 0.01, 0.3]);
    }

    #[test]
    fn test_assemble_rejects_missing() {
        let values: HashMap<String, f64> = [("rsi".to_string(), 55.0)].into_iter().collect();

        match spec().assemble(&values, MissingFeaturePolicy::default()) {
            Err(StockVolError::MissingFeatures(missing)) => {
                assert_eq!(missing, vec!["returns".to_string(), "volatility_5".to_string()]);
            }
            other => panic!("expected MissingFeatures, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_fill_substitutes() {
        let values: HashMap<String, f64> = [("rsi".to_string(), 55.0)].into_iter().collect();
        let row = spec()
            .assemble(&values, MissingFeaturePolicy::Fill(0.0))
            .unwrap();
        assert_eq!(row.to_vec(), vec![55.0, 0.0, 0.0]);
    }
}
