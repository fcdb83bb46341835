//! Forward-looking volatility targets

use crate::timeseries::{shift, window_stat, RollingStat};
use ndarray::Array1;

/// Name of the shifted-returns helper column
pub const FUTURE_RETURNS: &str = "future_returns";
/// Absolute next-horizon return
pub const TARGET_VOLATILITY: &str = "target_volatility";
/// Realized volatility over the horizon
pub const TARGET_REALIZED_VOL: &str = "target_realized_vol";

/// Target columns built from a returns series
#[derive(Debug, Clone)]
pub struct Targets {
    pub future_returns: Array1<f64>,
    pub target_volatility: Array1<f64>,
    pub target_realized_vol: Array1<f64>,
}

impl Targets {
    /// `horizon` must be at least 1
    pub fn compute(returns: &Array1<f64>, horizon: usize) -> Self {
        let future_returns = shift(returns, -(horizon as isize));
        let target_volatility = future_returns.mapv(f64::abs);
        let target_realized_vol = if horizon > 1 {
            forward_std(returns, horizon)
        } else {
            target_volatility.clone()
        };

        Self {
            future_returns,
            target_volatility,
            target_realized_vol,
        }
    }

    /// `(name, values)` pairs in output column order
    pub fn columns(self) -> Vec<(&'static str, Array1<f64>)> {
        vec![
            (FUTURE_RETURNS, self.future_returns),
            (TARGET_VOLATILITY, self.target_volatility),
            (TARGET_REALIZED_VOL, self.target_realized_vol),
        ]
    }
}

/// Sample std of `returns[t+1..=t+horizon]`, undefined when the window runs
/// past the end or contains an undefined return
fn forward_std(returns: &Array1<f64>, horizon: usize) -> Array1<f64> {
    let n = returns.len();
    Array1::from_shape_fn(n, |t| {
        let end = t + horizon;
        if end >= n {
            return f64::NAN;
        }
        let window: Vec<f64> = returns.slice(ndarray::s![t + 1..=end]).to_vec();
        if window.iter().any(|v| v.is_nan()) {
            f64::NAN
        } else {
            window_stat(&window, RollingStat::Std)
        }
    })
}

/// Whether a column is a training target or its helper
pub fn is_target_column(name: &str) -> bool {
    name == FUTURE_RETURNS || name.starts_with("target_")
}
