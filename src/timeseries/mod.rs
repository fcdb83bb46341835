//! Time series module
//!
//! Provides the window primitives the feature pipeline is built from:
//! - Shifts, differences and percentage changes
//! - Trailing rolling statistics
//! - Adjust-free exponentially weighted means
//! - Calendar features and cyclical encodings

mod calendar;
mod rolling;

pub use calendar::{has_intraday_hours, CalendarFeatures, CALENDAR_COLUMNS};
pub use rolling::{
    diff, ewm_mean, log_change, pct_change, rolling, shift, window_stat, RollingStat,
};
