//! Synthetic OHLCV generation
//!
//! Seeded random-walk price bars for demos, tests and benchmarks. The output
//! is internally consistent, so it passes every quality check.

use crate::error::{Result, StockVolError};
use crate::frame::{Column, TimeSeriesFrame};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::prelude::*;

/// Random-walk OHLCV generator
#[derive(Debug, Clone)]
pub struct SyntheticOhlcv {
    /// Number of bars
    pub rows: usize,
    /// Timestamp of the first bar
    pub start: NaiveDateTime,
    /// Spacing between bars
    pub step: Duration,
    /// Open of the first bar
    pub start_price: f64,
    /// Largest absolute per-bar return
    pub max_move: f64,
    /// Random seed; `None` draws from entropy
    pub seed: Option<u64>,
    /// Adds a constant text `symbol` column when set
    pub symbol: Option<String>,
}

impl Default for SyntheticOhlcv {
    fn default() -> Self {
        Self {
            rows: 500,
            start: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            step: Duration::hours(1),
            start_price: 150.0,
            max_move: 0.02,
            seed: None,
            symbol: None,
        }
    }
}

impl SyntheticOhlcv {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set bar spacing
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Set the first timestamp
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    /// Set the opening price
    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    /// Attach a symbol column
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Generate the frame
    pub fn generate(&self) -> Result<TimeSeriesFrame> {
        if self.start_price <= 0.0 || !self.start_price.is_finite() {
            return Err(StockVolError::InvalidParameter {
                name: "start_price".to_string(),
                value: self.start_price.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.max_move) {
            return Err(StockVolError::InvalidParameter {
                name: "max_move".to_string(),
                value: self.max_move.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let n = self.rows;
        let mut timestamps = Vec::with_capacity(n);
        let mut open = Vec::with_capacity(n);
        let mut high = Vec::with_capacity(n);
        let mut low = Vec::with_capacity(n);
        let mut close = Vec::with_capacity(n);
        let mut volume = Vec::with_capacity(n);

        let mut ts = self.start;
        let mut prev_close = self.start_price;

        for _ in 0..n {
            let change = rng.gen_range(-self.max_move..=self.max_move);
            let o = prev_close;
            let c = o * (1.0 + change);
            let h = o.max(c) * (1.0 + rng.gen::<f64>() * self.max_move / 2.0);
            let l = o.min(c) * (1.0 - rng.gen::<f64>() * self.max_move / 2.0);
            let v = rng.gen_range(1_000_000u64..10_000_000u64) as f64;

            timestamps.push(ts);
            open.push(o);
            high.push(h);
            low.push(l);
            close.push(c);
            volume.push(v);

            prev_close = c;
            ts += self.step;
        }

        let frame = TimeSeriesFrame::from_ohlcv(timestamps, open, high, low, close, volume)?;
        match &self.symbol {
            Some(symbol) => frame.with_column("symbol", Column::Text(vec![Some(symbol.clone()); n])),
            None => Ok(frame),
        }
    }
}
