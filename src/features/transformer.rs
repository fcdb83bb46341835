//! Feature pipeline for volatility prediction

use super::config::FeatureConfig;
use super::feature_frame::FeatureFrame;
use super::indicators::{momentum, rsi, volume_ratio, Macd};
use super::spec::FeatureSpec;
use super::target::{is_target_column, Targets};
use crate::error::{Result, StockVolError};
use crate::frame::TimeSeriesFrame;
use crate::timeseries::{log_change, pct_change, rolling, shift, CalendarFeatures, RollingStat};
use ndarray::Array1;
use std::collections::HashSet;
use tracing::{debug, info};

/// Builds features and targets from a raw OHLCV frame.
///
/// Every stage takes a frame and returns a new frame with extra columns;
/// nothing is carried between calls. Feature columns at row `t` only read
/// rows `<= t`. The target stage is the only one that looks ahead.
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    config: FeatureConfig,
}

impl FeatureTransformer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    fn price<'a>(&self, frame: &'a TimeSeriesFrame) -> Result<&'a Array1<f64>> {
        let name = &self.config.target_column;
        match frame.column(name) {
            None => Err(StockVolError::FeatureNotFound(name.clone())),
            Some(column) => column
                .as_numeric()
                .ok_or_else(|| StockVolError::NonNumericColumn(name.clone())),
        }
    }

    /// `returns` and `log_returns` of the price column
    pub fn calculate_returns(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let price = self.price(frame)?;
        let returns = pct_change(price);
        let log_returns = log_change(price);

        frame
            .clone()
            .with_column("returns", returns)?
            .with_column("log_returns", log_returns)
    }

    /// `volatility_{w}`: sample std of returns over each trailing window
    pub fn calculate_volatility(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let mut out = match frame.numeric("returns") {
            Some(_) => frame.clone(),
            None => self.calculate_returns(frame)?,
        };

        let returns = out
            .numeric("returns")
            .cloned()
            .ok_or_else(|| StockVolError::FeatureNotFound("returns".to_string()))?;

        for &window in &self.config.volatility_windows {
            out.set_column(
                format!("volatility_{}", window),
                rolling(&returns, window, RollingStat::Std),
            )?;
        }

        Ok(out)
    }

    /// `{col}_lag_{k}` for every configured column that is present and numeric
    pub fn create_lag_features(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let mut out = frame.clone();

        for col in &self.config.lag_columns {
            let Some(values) = frame.numeric(col) else {
                debug!(column = %col, "Skipping lags for absent or non-numeric column");
                continue;
            };
            for &lag in &self.config.lags {
                out.set_column(format!("{}_lag_{}", col, lag), shift(values, lag as isize))?;
            }
        }

        Ok(out)
    }

    /// Rolling mean, std, min, max and Bollinger bands of the price column
    pub fn create_rolling_features(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let price = self.price(frame)?;
        let prefix = &self.config.target_column;
        let mut out = frame.clone();

        for &window in &self.config.rolling_windows {
            let ma = rolling(price, window, RollingStat::Mean);
            let std = rolling(price, window, RollingStat::Std);
            let min = rolling(price, window, RollingStat::Min);
            let max = rolling(price, window, RollingStat::Max);
            let upper = &ma + &(&std * 2.0);
            let lower = &ma - &(&std * 2.0);

            out.set_column(format!("{}_ma_{}", prefix, window), ma)?;
            out.set_column(format!("{}_std_{}", prefix, window), std)?;
            out.set_column(format!("{}_min_{}", prefix, window), min)?;
            out.set_column(format!("{}_max_{}", prefix, window), max)?;
            out.set_column(format!("bb_upper_{}", window), upper)?;
            out.set_column(format!("bb_lower_{}", window), lower)?;
        }

        Ok(out)
    }

    /// RSI, MACD, momentum and (when `volume` exists) volume indicators
    pub fn create_technical_indicators(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let config = &self.config;
        let price = self.price(frame)?;
        let mut out = frame.clone();

        out.set_column("rsi", rsi(price, config.rsi_period))?;

        let macd = Macd::compute(price, config.macd_fast, config.macd_slow, config.macd_signal);
        out.set_column("macd", macd.macd)?;
        out.set_column("macd_signal", macd.signal)?;
        out.set_column("macd_diff", macd.diff)?;

        for &period in &config.momentum_periods {
            out.set_column(format!("momentum_{}", period), momentum(price, period))?;
        }

        if let Some(volume) = frame.numeric("volume") {
            let mut longest: Option<(usize, Array1<f64>)> = None;
            for &window in &config.volume_windows {
                let ma = rolling(volume, window, RollingStat::Mean);
                if longest.as_ref().map_or(true, |(w, _)| window > *w) {
                    longest = Some((window, ma.clone()));
                }
                out.set_column(format!("volume_ma_{}", window), ma)?;
            }
            if let Some((_, base)) = longest {
                out.set_column("volume_ratio", volume_ratio(volume, &base))?;
            }
        } else {
            debug!("No numeric volume column, skipping volume indicators");
        }

        Ok(out)
    }

    /// Calendar encodings of the timestamp index
    pub fn create_time_features(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame> {
        let timestamps = frame
            .index()
            .timestamps()
            .ok_or(StockVolError::NonTemporalIndex)?;

        let mut out = frame.clone();
        for (name, values) in CalendarFeatures::from_timestamps(timestamps).columns() {
            out.set_column(name, values)?;
        }

        Ok(out)
    }

    /// `future_returns`, `target_volatility` and `target_realized_vol`
    pub fn create_target_variable(
        &self,
        frame: &TimeSeriesFrame,
        horizon: usize,
    ) -> Result<TimeSeriesFrame> {
        check_horizon(horizon)?;

        let returns = frame
            .numeric("returns")
            .ok_or_else(|| StockVolError::FeatureNotFound("returns".to_string()))?;

        let mut out = frame.clone();
        for (name, values) in Targets::compute(returns, horizon).columns() {
            out.set_column(name, values)?;
        }

        Ok(out)
    }

    /// Run every stage, drop incomplete rows and derive the feature list
    pub fn transform(
        &self,
        frame: &TimeSeriesFrame,
        horizon: usize,
    ) -> Result<(FeatureFrame, FeatureSpec)> {
        check_horizon(horizon)?;
        self.config.validate()?;
        self.price(frame)?;
        if !frame.index().is_temporal() {
            return Err(StockVolError::NonTemporalIndex);
        }

        info!(rows = frame.height(), columns = frame.width(), horizon, "Starting feature transformation");

        let df = self.calculate_returns(frame)?;
        debug!("Calculated returns");
        let df = self.calculate_volatility(&df)?;
        debug!("Calculated volatility measures");
        let df = self.create_lag_features(&df)?;
        debug!("Created lag features");
        let df = self.create_rolling_features(&df)?;
        debug!("Created rolling features");
        let df = self.create_technical_indicators(&df)?;
        debug!("Created technical indicators");
        let df = self.create_time_features(&df)?;
        debug!("Created time features");
        let df = self.create_target_variable(&df, horizon)?;
        debug!("Created target variable");

        let initial_rows = df.height();
        let features = FeatureFrame::finalize(df);
        let spec = derive_spec(frame, &features);

        info!(
            dropped = initial_rows - features.height(),
            rows = features.height(),
            features = spec.len(),
            "Transformation complete"
        );

        Ok((features, spec))
    }
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(StockVolError::InvalidParameter {
            name: "horizon".to_string(),
            value: horizon.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Derived numeric columns in frame order, minus raw inputs and targets
fn derive_spec(raw: &TimeSeriesFrame, features: &FeatureFrame) -> FeatureSpec {
    let raw_columns: HashSet<&str> = raw.column_names().into_iter().collect();

    let names = features
        .frame()
        .columns()
        .filter(|(name, column)| {
            !raw_columns.contains(name) && !is_target_column(name) && column.is_numeric()
        })
        .map(|(name, _)| name.to_string())
        .collect();

    FeatureSpec::new(names)
}
