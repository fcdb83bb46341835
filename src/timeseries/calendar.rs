//! Calendar features from timestamps

use chrono::{Datelike, NaiveDateTime, Timelike};
use ndarray::Array1;
use std::f64::consts::PI;

/// Column names in the order [`CalendarFeatures::columns`] yields them
pub const CALENDAR_COLUMNS: [&str; 9] = [
    "hour",
    "hour_sin",
    "hour_cos",
    "day_of_week",
    "day_of_month",
    "month",
    "quarter",
    "day_sin",
    "day_cos",
];

/// Calendar encodings for a timestamp sequence
#[derive(Debug, Clone)]
pub struct CalendarFeatures {
    pub hour: Array1<f64>,
    pub hour_sin: Array1<f64>,
    pub hour_cos: Array1<f64>,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: Array1<f64>,
    pub day_of_month: Array1<f64>,
    pub month: Array1<f64>,
    pub quarter: Array1<f64>,
    pub day_sin: Array1<f64>,
    pub day_cos: Array1<f64>,
}

impl CalendarFeatures {
    /// Extract calendar encodings.
    ///
    /// Hour encodings use the actual hour only when at least one timestamp has
    /// a non-zero hour; daily data gets the neutral `hour = 0, sin = 0, cos = 1`.
    pub fn from_timestamps(timestamps: &[NaiveDateTime]) -> Self {
        let n = timestamps.len();
        let intraday = has_intraday_hours(timestamps);

        let (hour, hour_sin, hour_cos) = if intraday {
            let hour = Array1::from_iter(timestamps.iter().map(|ts| ts.hour() as f64));
            let hour_sin = hour.mapv(|h| cyclical_sin(h, 24.0));
            let hour_cos = hour.mapv(|h| cyclical_cos(h, 24.0));
            (hour, hour_sin, hour_cos)
        } else {
            (
                Array1::zeros(n),
                Array1::zeros(n),
                Array1::from_elem(n, 1.0),
            )
        };

        let day_of_week = Array1::from_iter(
            timestamps
                .iter()
                .map(|ts| ts.weekday().num_days_from_monday() as f64),
        );
        let day_of_month = Array1::from_iter(timestamps.iter().map(|ts| ts.day() as f64));
        let month = Array1::from_iter(timestamps.iter().map(|ts| ts.month() as f64));
        let quarter = month.mapv(|m| ((m as u32 - 1) / 3 + 1) as f64);
        let day_sin = day_of_week.mapv(|d| cyclical_sin(d, 7.0));
        let day_cos = day_of_week.mapv(|d| cyclical_cos(d, 7.0));

        Self {
            hour,
            hour_sin,
            hour_cos,
            day_of_week,
            day_of_month,
            month,
            quarter,
            day_sin,
            day_cos,
        }
    }

    /// `(name, values)` pairs in [`CALENDAR_COLUMNS`] order
    pub fn columns(self) -> Vec<(&'static str, Array1<f64>)> {
        let values = [
            self.hour,
            self.hour_sin,
            self.hour_cos,
            self.day_of_week,
            self.day_of_month,
            self.month,
            self.quarter,
            self.day_sin,
            self.day_cos,
        ];
        CALENDAR_COLUMNS.into_iter().zip(values).collect()
    }
}

/// Whether any timestamp carries sub-day resolution at the hour level
pub fn has_intraday_hours(timestamps: &[NaiveDateTime]) -> bool {
    timestamps.iter().any(|ts| ts.hour() != 0)
}

fn cyclical_sin(value: f64, period: f64) -> f64 {
    (2.0 * PI * value / period).sin()
}

fn cyclical_cos(value: f64, period: f64) -> f64 {
    (2.0 * PI * value / period).cos()
}
