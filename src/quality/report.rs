//! Quality check results and the text report

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The six checks run against every raw frame, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Schema,
    NullValues,
    DataTypes,
    ValueRanges,
    Temporal,
    SufficientData,
}

impl Check {
    pub const ALL: [Check; 6] = [
        Check::Schema,
        Check::NullValues,
        Check::DataTypes,
        Check::ValueRanges,
        Check::Temporal,
        Check::SufficientData,
    ];

    /// Snake-case name used in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            Check::Schema => "schema",
            Check::NullValues => "null_values",
            Check::DataTypes => "data_types",
            Check::ValueRanges => "value_ranges",
            Check::Temporal => "temporal",
            Check::SufficientData => "sufficient_data",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one `run_all_checks` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    all_passed: bool,
    checks: BTreeMap<Check, bool>,
    issues: Vec<String>,
}

impl QualityReport {
    pub(crate) fn new(checks: BTreeMap<Check, bool>, issues: Vec<String>) -> Self {
        let all_passed = Check::ALL
            .iter()
            .all(|check| checks.get(check).copied().unwrap_or(false));
        Self {
            all_passed,
            checks,
            issues,
        }
    }

    /// Logical AND of every check
    pub fn all_passed(&self) -> bool {
        self.all_passed
    }

    pub fn checks(&self) -> &BTreeMap<Check, bool> {
        &self.checks
    }

    /// Result of a single check, if it ran
    pub fn passed(&self, check: Check) -> Option<bool> {
        self.checks.get(&check).copied()
    }

    /// Human-readable issues in the order they were found
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the fixed-layout text report
    pub fn render(&self, shape: (usize, usize), generated_at: NaiveDateTime) -> String {
        let mut report = String::new();

        report.push_str("\nDATA QUALITY REPORT\n");
        report.push_str("==================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!("Dataset Shape: ({}, {})\n", shape.0, shape.1));
        report.push_str("\nCHECK RESULTS:\n");

        for (check, passed) in &self.checks {
            let status = if *passed { "✓ PASSED" } else { "✗ FAILED" };
            report.push_str(&format!("  {}: {}\n", check.name().to_uppercase(), status));
        }

        if self.issues.is_empty() {
            report.push_str("\n✓ No issues found!\n");
        } else {
            report.push_str(&format!("\nISSUES FOUND ({}):\n", self.issues.len()));
            for (i, issue) in self.issues.iter().enumerate() {
                report.push_str(&format!("  {}. {}\n", i + 1, issue));
            }
        }

        report.push_str(&format!(
            "\nOVERALL STATUS: {}\n",
            if self.all_passed { "PASSED" } else { "FAILED" }
        ));
        report.push_str(&"=".repeat(50));
        report.push('\n');

        report
    }
}
