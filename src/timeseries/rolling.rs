//! Window primitives over a single series
//!
//! All functions take and return `Array1<f64>` of the same length as the
//! input. NaN marks an undefined value: warm-up positions, positions shifted
//! past either end, and any window that contains a NaN.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Rolling statistics types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RollingStat {
    Mean,
    /// Sample standard deviation (one degree of freedom removed)
    Std,
    Min,
    Max,
    Sum,
}

/// Shift a series by `periods`; positive values look back, negative look ahead
pub fn shift(series: &Array1<f64>, periods: isize) -> Array1<f64> {
    let n = series.len() as isize;
    Array1::from_shape_fn(series.len(), |i| {
        let source = i as isize - periods;
        if source >= 0 && source < n {
            series[source as usize]
        } else {
            f64::NAN
        }
    })
}

/// `series[t] - series[t - periods]`
pub fn diff(series: &Array1<f64>, periods: usize) -> Array1<f64> {
    let n = series.len();
    let mut result = Array1::from_elem(n, f64::NAN);

    for i in periods..n {
        result[i] = series[i] - series[i - periods];
    }

    result
}

/// `series[t] / series[t - 1] - 1`; non-finite ratios are undefined
pub fn pct_change(series: &Array1<f64>) -> Array1<f64> {
    let n = series.len();
    let mut result = Array1::from_elem(n, f64::NAN);

    for i in 1..n {
        let change = series[i] / series[i - 1] - 1.0;
        if change.is_finite() {
            result[i] = change;
        }
    }

    result
}

/// `ln(series[t] / series[t - 1])`; non-finite values are undefined
pub fn log_change(series: &Array1<f64>) -> Array1<f64> {
    let n = series.len();
    let mut result = Array1::from_elem(n, f64::NAN);

    for i in 1..n {
        let change = (series[i] / series[i - 1]).ln();
        if change.is_finite() {
            result[i] = change;
        }
    }

    result
}

/// Trailing-window statistic; a full window of defined values is required
pub fn rolling(series: &Array1<f64>, window: usize, stat: RollingStat) -> Array1<f64> {
    let n = series.len();
    let mut result = Array1::from_elem(n, f64::NAN);

    if window == 0 {
        return result;
    }

    for i in (window - 1)..n {
        let values: Vec<f64> = series.slice(ndarray::s![i + 1 - window..=i]).to_vec();
        if values.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window_stat(&values, stat);
    }

    result
}

/// Statistic over an already-selected window of defined values
pub fn window_stat(values: &[f64], stat: RollingStat) -> f64 {
    let len = values.len();
    if len == 0 {
        return f64::NAN;
    }

    match stat {
        RollingStat::Mean => values.iter().sum::<f64>() / len as f64,
        RollingStat::Sum => values.iter().sum(),
        RollingStat::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        RollingStat::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        RollingStat::Std => {
            if len < 2 {
                return f64::NAN;
            }
            let mean = values.iter().sum::<f64>() / len as f64;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (len - 1) as f64;
            variance.sqrt()
        }
    }
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)` and no bias
/// adjustment.
///
/// Output starts at the first defined input. A NaN input repeats the previous
/// mean, and the previous mean's weight keeps decaying across the gap so the
/// next observation is weighted as if the gap had been observed.
pub fn ewm_mean(series: &Array1<f64>, span: usize) -> Array1<f64> {
    let n = series.len();
    let mut result = Array1::from_elem(n, f64::NAN);
    if n == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut weighted = series[0];
    let mut old_weight = 1.0;
    result[0] = weighted;

    for i in 1..n {
        let current = series[i];
        let observed = !current.is_nan();

        if !weighted.is_nan() {
            old_weight *= decay;
            if observed {
                if weighted != current {
                    weighted = (old_weight * weighted + alpha * current) / (old_weight + alpha);
                }
                old_weight = 1.0;
            }
        } else if observed {
            weighted = current;
        }

        result[i] = weighted;
    }

    result
}
