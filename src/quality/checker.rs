//! Data quality gate for raw OHLCV frames

use super::report::{Check, QualityReport};
use crate::frame::{TimeIndex, TimeSeriesFrame, OHLCV_COLUMNS, PRICE_COLUMNS};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Minimum number of rows `generate_report` asks for
pub const DEFAULT_MIN_ROWS: usize = 100;

/// Configuration for the quality checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Maximum allowed fraction of null cells (0.01 = 1%)
    pub null_threshold: f64,
    /// Columns that must be present
    pub required_columns: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            null_threshold: 0.01,
            required_columns: OHLCV_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl QualityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the null threshold
    pub fn with_null_threshold(mut self, threshold: f64) -> Self {
        self.null_threshold = threshold;
        self
    }

    /// Builder method to set the required columns
    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Runs schema, null, type, range, temporal and size checks.
///
/// Checks never fail for data problems: each one records a pass/fail flag and
/// appends issue strings, and the caller decides what a failure means.
#[derive(Debug, Clone, Default)]
pub struct QualityChecker {
    config: QualityConfig,
    checks: BTreeMap<Check, bool>,
    issues: Vec<String>,
}

impl QualityChecker {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            checks: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Results recorded since the last reset
    pub fn checks(&self) -> &BTreeMap<Check, bool> {
        &self.checks
    }

    /// Issues recorded since the last reset
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    fn record(&mut self, check: Check, passed: bool) -> bool {
        self.checks.insert(check, passed);
        passed
    }

    /// Fail if any required column is absent
    pub fn check_schema(&mut self, frame: &TimeSeriesFrame) -> bool {
        let missing: BTreeSet<&str> = self
            .config
            .required_columns
            .iter()
            .map(String::as_str)
            .filter(|col| !frame.has_column(col))
            .collect();

        if !missing.is_empty() {
            let rendered: Vec<String> = missing.iter().map(|c| format!("'{}'", c)).collect();
            self.issues.push(format!(
                "Missing required columns: {{{}}}",
                rendered.join(", ")
            ));
            return self.record(Check::Schema, false);
        }

        self.record(Check::Schema, true)
    }

    /// Fail if the fraction of null cells exceeds the threshold
    pub fn check_null_values(&mut self, frame: &TimeSeriesFrame) -> bool {
        let total_cells = frame.height() * frame.width();
        let null_count = frame.null_count();
        let null_ratio = if total_cells == 0 {
            0.0
        } else {
            null_count as f64 / total_cells as f64
        };

        debug!(null_count, total_cells, null_ratio, "Null value check");

        if null_ratio > self.config.null_threshold {
            self.issues.push(format!(
                "Null values ({:.2}%) exceed threshold ({}%)",
                null_ratio * 100.0,
                self.config.null_threshold * 100.0
            ));
            return self.record(Check::NullValues, false);
        }

        self.record(Check::NullValues, true)
    }

    /// Fail at the first OHLCV column that is present but not numeric
    pub fn check_data_types(&mut self, frame: &TimeSeriesFrame) -> bool {
        for col in OHLCV_COLUMNS {
            if let Some(column) = frame.column(col) {
                if !column.is_numeric() {
                    self.issues.push(format!("Column '{}' is not numeric type", col));
                    return self.record(Check::DataTypes, false);
                }
            }
        }

        self.record(Check::DataTypes, true)
    }

    /// Negative prices, negative volume and `high < low` rows; every sub-check
    /// runs and contributes its own issue
    pub fn check_value_ranges(&mut self, frame: &TimeSeriesFrame) -> bool {
        let mut issues_found = false;

        for col in PRICE_COLUMNS {
            if let Some(values) = frame.numeric(col) {
                let negative_count = values.iter().filter(|v| **v < 0.0).count();
                if negative_count > 0 {
                    self.issues
                        .push(format!("Found {} negative values in '{}'", negative_count, col));
                    issues_found = true;
                }
            }
        }

        if let Some(volume) = frame.numeric("volume") {
            let negative_volume = volume.iter().filter(|v| **v < 0.0).count();
            if negative_volume > 0 {
                self.issues
                    .push(format!("Found {} negative volume values", negative_volume));
                issues_found = true;
            }
        }

        if let (Some(high), Some(low)) = (frame.numeric("high"), frame.numeric("low")) {
            let invalid_ranges = high.iter().zip(low.iter()).filter(|(h, l)| h < l).count();
            if invalid_ranges > 0 {
                self.issues
                    .push(format!("Found {} rows where high < low", invalid_ranges));
                issues_found = true;
            }
        }

        self.record(Check::ValueRanges, !issues_found)
    }

    /// Fail on a non-timestamp index, duplicate timestamps or unsorted rows
    pub fn check_temporal_consistency(&mut self, frame: &TimeSeriesFrame) -> bool {
        let timestamps = match frame.index() {
            TimeIndex::Timestamps(ts) => ts,
            TimeIndex::Labels(_) => {
                self.issues.push("Index is not a timestamp index".to_string());
                return self.record(Check::Temporal, false);
            }
        };

        let mut seen = HashSet::with_capacity(timestamps.len());
        let duplicates = timestamps.iter().filter(|ts| !seen.insert(**ts)).count();
        if duplicates > 0 {
            self.issues
                .push(format!("Found {} duplicate timestamps", duplicates));
            return self.record(Check::Temporal, false);
        }

        if timestamps.windows(2).any(|pair| pair[1] < pair[0]) {
            self.issues
                .push("Data is not sorted chronologically".to_string());
            return self.record(Check::Temporal, false);
        }

        self.record(Check::Temporal, true)
    }

    /// Fail if the frame has fewer than `min_rows` rows
    pub fn check_sufficient_data(&mut self, frame: &TimeSeriesFrame, min_rows: usize) -> bool {
        if frame.height() < min_rows {
            self.issues.push(format!(
                "Insufficient data: {} rows (minimum: {})",
                frame.height(),
                min_rows
            ));
            return self.record(Check::SufficientData, false);
        }

        self.record(Check::SufficientData, true)
    }

    /// Reset state and run all six checks without short-circuiting
    pub fn run_all_checks(&mut self, frame: &TimeSeriesFrame, min_rows: usize) -> QualityReport {
        self.checks.clear();
        self.issues.clear();

        self.check_schema(frame);
        self.check_null_values(frame);
        self.check_data_types(frame);
        self.check_value_ranges(frame);
        self.check_temporal_consistency(frame);
        self.check_sufficient_data(frame, min_rows);

        let report = QualityReport::new(self.checks.clone(), self.issues.clone());

        if report.all_passed() {
            info!(rows = frame.height(), columns = frame.width(), "All quality checks passed");
        } else {
            warn!(
                rows = frame.height(),
                issues = report.issues().len(),
                "Quality checks failed"
            );
        }

        report
    }

    /// Run all checks with the default minimum row count and render the text
    /// report
    pub fn generate_report(&mut self, frame: &TimeSeriesFrame) -> String {
        let report = self.run_all_checks(frame, DEFAULT_MIN_ROWS);
        report.render(frame.shape(), Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn hourly(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::hours(i as i64)).collect()
    }

    fn clean_frame(n: usize) -> TimeSeriesFrame {
        let close: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        TimeSeriesFrame::from_ohlcv(
            hourly(n),
            close.clone(),
            close.iter().map(|c| c + 1.0).collect(),
            close.iter().map(|c| c - 1.0).collect(),
            close,
            vec![1_000_000.0; n],
        )
        .unwrap()
    }

    #[test]
    fn test_check_schema_pass() {
        let mut checker = QualityChecker::default();
        assert!(checker.check_schema(&clean_frame(10)));
        assert_eq!(checker.checks().get(&Check::Schema), Some(&true));
    }

    #[test]
    fn test_check_schema_reports_missing_columns() {
        let frame = TimeSeriesFrame::new(
            TimeIndex::Timestamps(hourly(2)),
            vec![("price".to_string(), vec![100.0, 101.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_schema(&frame));
        assert_eq!(
            checker.issues(),
            &["Missing required columns: {'close', 'high', 'low', 'open', 'volume'}".to_string()]
        );
    }

    #[test]
    fn test_custom_required_columns() {
        let config = QualityConfig::new().with_required_columns(["close"]);
        let frame = TimeSeriesFrame::new(
            TimeIndex::Timestamps(hourly(2)),
            vec![("close".to_string(), vec![100.0, 101.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::new(config);
        assert!(checker.check_schema(&frame));
    }

    #[test]
    fn test_null_threshold_boundary_is_inclusive() {
        // 20 rows x 5 columns = 100 cells; 1% threshold allows exactly one null
        let mut frame = clean_frame(20);
        frame.numeric_mut("close").unwrap()[0] = f64::NAN;

        let mut checker = QualityChecker::new(QualityConfig::new().with_null_threshold(0.01));
        assert!(checker.check_null_values(&frame));

        frame.numeric_mut("open").unwrap()[3] = f64::NAN;
        assert!(!checker.check_null_values(&frame));
        assert_eq!(
            checker.issues().last().unwrap(),
            "Null values (2.00%) exceed threshold (1%)"
        );
    }

    #[test]
    fn test_null_check_counts_text_nulls() {
        let mut frame = clean_frame(4);
        frame
            .set_column("symbol", Column::Text(vec![None, None, None, None]))
            .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_null_values(&frame));
    }

    #[test]
    fn test_empty_frame_has_no_null_issue() {
        let frame = clean_frame(0);
        let mut checker = QualityChecker::default();
        assert!(checker.check_null_values(&frame));
    }

    #[test]
    fn test_check_data_types_stops_at_first_text_column() {
        let mut frame = clean_frame(3);
        frame
            .set_column("high", Column::Text(vec![Some("x".into()); 3]))
            .unwrap();
        frame
            .set_column("low", Column::Text(vec![Some("y".into()); 3]))
            .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_data_types(&frame));
        assert_eq!(checker.issues(), &["Column 'high' is not numeric type".to_string()]);
        assert!(!frame.column("low").unwrap().is_numeric());
    }

    #[test]
    fn test_value_range_issues_accumulate() {
        let mut frame = clean_frame(10);
        frame.numeric_mut("close").unwrap()[1] = -100.0;
        frame.numeric_mut("volume").unwrap()[4] = -5.0;
        frame.numeric_mut("high").unwrap()[2] = 50.0;
        frame.numeric_mut("low").unwrap()[2] = 150.0;

        let mut checker = QualityChecker::default();
        assert!(!checker.check_value_ranges(&frame));
        assert_eq!(
            checker.issues(),
            &[
                "Found 1 negative values in 'close'".to_string(),
                "Found 1 negative volume values".to_string(),
                "Found 1 rows where high < low".to_string(),
            ]
        );
    }

    #[test]
    fn test_high_low_fix_clears_range_issue() {
        let mut frame = clean_frame(10);
        frame.numeric_mut("high").unwrap()[2] = 50.0;
        frame.numeric_mut("low").unwrap()[2] = 150.0;

        let mut checker = QualityChecker::default();
        assert!(!checker.check_value_ranges(&frame));
        assert!(!checker.issues().is_empty());

        frame.numeric_mut("high").unwrap()[2] = 150.0;
        let report = checker.run_all_checks(&frame, 5);
        assert_eq!(report.passed(Check::ValueRanges), Some(true));
        assert!(report.issues().is_empty());
    }

    #[test]
    fn test_temporal_rejects_label_index() {
        let frame = TimeSeriesFrame::new(
            TimeIndex::Labels(vec!["a".into(), "b".into()]),
            vec![("close".to_string(), vec![1.0, 2.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_temporal_consistency(&frame));
        assert_eq!(checker.issues(), &["Index is not a timestamp index".to_string()]);
    }

    #[test]
    fn test_temporal_duplicates_reported_before_ordering() {
        let mut ts = hourly(4);
        ts[3] = ts[0];
        let frame = TimeSeriesFrame::new(
            TimeIndex::Timestamps(ts),
            vec![("close".to_string(), vec![1.0, 2.0, 3.0, 4.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_temporal_consistency(&frame));
        assert_eq!(checker.issues(), &["Found 1 duplicate timestamps".to_string()]);
    }

    #[test]
    fn test_temporal_rejects_unsorted() {
        let mut ts = hourly(3);
        ts.swap(0, 2);
        let frame = TimeSeriesFrame::new(
            TimeIndex::Timestamps(ts),
            vec![("close".to_string(), vec![1.0, 2.0, 3.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::default();
        assert!(!checker.check_temporal_consistency(&frame));
        assert_eq!(checker.issues(), &["Data is not sorted chronologically".to_string()]);
    }

    #[test]
    fn test_sufficient_data() {
        let mut checker = QualityChecker::default();
        assert!(!checker.check_sufficient_data(&clean_frame(50), 100));
        assert_eq!(
            checker.issues(),
            &["Insufficient data: 50 rows (minimum: 100)".to_string()]
        );
        assert!(checker.check_sufficient_data(&clean_frame(100), 100));
    }

    #[test]
    fn test_run_all_checks_does_not_short_circuit() {
        let frame = TimeSeriesFrame::new(
            TimeIndex::Labels(vec!["x".into()]),
            vec![("price".to_string(), vec![-1.0].into())],
        )
        .unwrap();

        let mut checker = QualityChecker::default();
        let report = checker.run_all_checks(&frame, 100);

        assert!(!report.all_passed());
        assert_eq!(report.checks().len(), 6);
        assert_eq!(report.passed(Check::Schema), Some(false));
        assert_eq!(report.passed(Check::Temporal), Some(false));
        assert_eq!(report.passed(Check::SufficientData), Some(false));
        assert_eq!(report.issues().len(), 3);
    }

    #[test]
    fn test_run_all_checks_resets_state() {
        let mut checker = QualityChecker::default();
        let failing = checker.run_all_checks(&clean_frame(10), 100);
        assert!(!failing.all_passed());

        let passing = checker.run_all_checks(&clean_frame(120), 100);
        assert!(passing.all_passed());
        assert!(passing.issues().is_empty());
        assert!(checker.issues().is_empty());
    }

    #[test]
    fn test_run_all_checks_is_idempotent() {
        let mut frame = clean_frame(30);
        frame.numeric_mut("low").unwrap()[5] = 500.0;

        let mut checker = QualityChecker::default();
        let first = checker.run_all_checks(&frame, 100);
        let second = checker.run_all_checks(&frame, 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_report_contains_banner() {
        let mut checker = QualityChecker::default();
        let text = checker.generate_report(&clean_frame(150));
        assert!(text.contains("DATA QUALITY REPORT"));
        assert!(text.contains("Dataset Shape: (150, 5)"));
        assert!(text.contains("OVERALL STATUS: PASSED"));
    }
}
