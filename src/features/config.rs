//! Feature pipeline configuration

use crate::error::{Result, StockVolError};
use serde::{Deserialize, Serialize};

/// Windows, lags and indicator periods used by the transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Price column returns and indicators are computed from
    pub target_column: String,
    /// Windows for rolling return volatility
    pub volatility_windows: Vec<usize>,
    /// Windows for rolling price statistics and Bollinger bands
    pub rolling_windows: Vec<usize>,
    /// Lag periods
    pub lags: Vec<usize>,
    /// Columns to lag; absent ones are skipped
    pub lag_columns: Vec<String>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub momentum_periods: Vec<usize>,
    /// Volume moving-average windows; the longest is the `volume_ratio` base
    pub volume_windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target_column: "close".to_string(),
            volatility_windows: vec![3, 5, 10],
            rolling_windows: vec![3, 5, 10],
            lags: vec![1, 2, 3],
            lag_columns: vec![
                "close".to_string(),
                "returns".to_string(),
                "volume".to_string(),
            ],
            rsi_period: 7,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            momentum_periods: vec![3, 5],
            volume_windows: vec![5, 10],
        }
    }
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the price column
    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    /// Builder method to set volatility windows
    pub fn with_volatility_windows(mut self, windows: Vec<usize>) -> Self {
        self.volatility_windows = windows;
        self
    }

    /// Builder method to set rolling price windows
    pub fn with_rolling_windows(mut self, windows: Vec<usize>) -> Self {
        self.rolling_windows = windows;
        self
    }

    /// Builder method to set lag periods
    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    /// Builder method to set the lagged columns
    pub fn with_lag_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lag_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the RSI period
    pub fn with_rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = period;
        self
    }

    /// Builder method to set MACD spans
    pub fn with_macd(mut self, fast: usize, slow: usize, signal: usize) -> Self {
        self.macd_fast = fast;
        self.macd_slow = slow;
        self.macd_signal = signal;
        self
    }

    /// Builder method to set momentum periods
    pub fn with_momentum_periods(mut self, periods: Vec<usize>) -> Self {
        self.momentum_periods = periods;
        self
    }

    /// Builder method to set volume windows
    pub fn with_volume_windows(mut self, windows: Vec<usize>) -> Self {
        self.volume_windows = windows;
        self
    }

    /// Reject zero-length windows and periods
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("volatility_windows", &self.volatility_windows),
            ("rolling_windows", &self.rolling_windows),
            ("lags", &self.lags),
            ("momentum_periods", &self.momentum_periods),
            ("volume_windows", &self.volume_windows),
        ];
        for (name, values) in named {
            if values.contains(&0) {
                return Err(StockVolError::InvalidParameter {
                    name: name.to_string(),
                    value: format!("{:?}", values),
                    reason: "must not contain 0".to_string(),
                });
            }
        }

        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(StockVolError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}
