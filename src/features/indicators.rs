//! Technical indicators over a price or volume series

use crate::timeseries::{diff, ewm_mean, rolling, RollingStat};
use ndarray::Array1;

/// Relative strength index from simple averages of gains and losses.
///
/// Undefined price differences count as no movement, so the first value is
/// defined at `period - 1`. A window without losses is 100 when it has gains
/// and 50 when the price did not move at all.
pub fn rsi(price: &Array1<f64>, period: usize) -> Array1<f64> {
    let delta = diff(price, 1);
    let gains = delta.mapv(|d| if d > 0.0 { d } else { 0.0 });
    let losses = delta.mapv(|d| if d < 0.0 { -d } else { 0.0 });

    let avg_gain = rolling(&gains, period, RollingStat::Mean);
    let avg_loss = rolling(&losses, period, RollingStat::Mean);

    Array1::from_shape_fn(price.len(), |i| {
        let (gain, loss) = (avg_gain[i], avg_loss[i]);
        if gain.is_nan() || loss.is_nan() {
            f64::NAN
        } else if loss == 0.0 {
            if gain > 0.0 {
                100.0
            } else {
                50.0
            }
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        }
    })
}

/// MACD line, signal line and their difference
#[derive(Debug, Clone)]
pub struct Macd {
    pub macd: Array1<f64>,
    pub signal: Array1<f64>,
    pub diff: Array1<f64>,
}

impl Macd {
    pub fn compute(price: &Array1<f64>, fast: usize, slow: usize, signal: usize) -> Self {
        let macd = ewm_mean(price, fast) - ewm_mean(price, slow);
        let signal = ewm_mean(&macd, signal);
        let diff = &macd - &signal;
        Self { macd, signal, diff }
    }
}

/// `price[t] - price[t - period]`
pub fn momentum(price: &Array1<f64>, period: usize) -> Array1<f64> {
    diff(price, period)
}

/// `volume / base`; a zero base average is undefined
pub fn volume_ratio(volume: &Array1<f64>, base: &Array1<f64>) -> Array1<f64> {
    let mut ratio = volume / base;
    ratio.mapv_inplace(|r| if r.is_finite() { r } else { f64::NAN });
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rsi_bounds_and_warmup() {
        let price = array![10.0, 11.0, 10.5, 12.0, 11.0, 11.5, 13.0, 12.0, 12.5, 14.0];
        let values = rsi(&price, 3);

        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
        for v in values.iter().skip(2) {
            assert!((0.0..=100.0).contains(v), "rsi out of range: {}", v);
        }
    }

    #[test]
    fn test_rsi_known_value() {
        // Window over diffs [NaN->0, +2, -1]: gain 2/3, loss 1/3, rs 2
        let price = array![10.0, 12.0, 11.0];
        let values = rsi(&price, 3);
        assert!((values[2] - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_without_losses() {
        let rising = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(rsi(&rising, 2)[3], 100.0);

        let flat = array![5.0, 5.0, 5.0, 5.0];
        assert_eq!(rsi(&flat, 2)[3], 50.0);
    }

    #[test]
    fn test_macd_of_constant_price_is_zero() {
        let price = Array1::from_elem(40, 100.0);
        let macd = Macd::compute(&price, 12, 26, 9);
        assert!(macd.macd.iter().all(|v| v.abs() < 1e-12));
        assert!(macd.signal.iter().all(|v| v.abs() < 1e-12));
        assert!(macd.diff.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_macd_defined_from_first_row() {
        let price = array![1.0, 2.0, 3.0];
        let macd = Macd::compute(&price, 2, 3, 2);
        assert_eq!(macd.macd[0], 0.0);
        // fast alpha 2/3, slow alpha 1/2
        let expected = (1.0 / 3.0 + 2.0 * 2.0 / 3.0) - 1.5;
        assert!((macd.macd[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_is_a_difference() {
        let price = array![10.0, 12.0, 15.0, 11.0];
        let m = momentum(&price, 2);
        assert!(m[1].is_nan());
        assert_eq!(m[2], 5.0);
        assert_eq!(m[3], -1.0);
    }

    #[test]
    fn test_volume_ratio_zero_base_is_undefined() {
        let volume = array![10.0, 0.0, 30.0];
        let base = array![20.0, 0.0, f64::NAN];
        let ratio = volume_ratio(&volume, &base);
        assert_eq!(ratio[0], 0.5);
        assert!(ratio[1].is_nan());
        assert!(ratio[2].is_nan());
    }
}
