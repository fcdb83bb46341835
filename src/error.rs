//! Error types for the stockvol crate

use thiserror::Error;

/// Result type alias for stockvol operations
pub type Result<T> = std::result::Result<T, StockVolError>;

/// Main error type for the feature and data-quality core
#[derive(Error, Debug)]
pub enum StockVolError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("Index is not a timestamp index")]
    NonTemporalIndex,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Missing live features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("Data quality checks failed: {}", .issues.join("; "))]
    QualityGateFailed { issues: Vec<String> },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for StockVolError {
    fn from(err: polars::error::PolarsError) -> Self {
        StockVolError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for StockVolError {
    fn from(err: serde_json::Error) -> Self {
        StockVolError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for StockVolError {
    fn from(err: ndarray::ShapeError) -> Self {
        StockVolError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockVolError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StockVolError = io_err.into();
        assert!(matches!(err, StockVolError::IoError(_)));
    }

    #[test]
    fn test_quality_gate_display_joins_issues() {
        let err = StockVolError::QualityGateFailed {
            issues: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Data quality checks failed: a; b");
    }

    #[test]
    fn test_missing_features_display() {
        let err = StockVolError::MissingFeatures(vec!["rsi".to_string(), "macd".to_string()]);
        assert_eq!(err.to_string(), "Missing live features: rsi, macd");
    }
}
