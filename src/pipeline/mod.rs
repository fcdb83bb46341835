//! Check, gate, transform and persist
//!
//! The two core steps of the daily workflow between extraction and training:
//! validate the raw frame, then turn it into a feature frame and the files
//! the trainer and the serving process read.

use crate::config::{GateMode, PipelineConfig};
use crate::drift::FeatureBaseline;
use crate::error::{Result, StockVolError};
use crate::features::{FeatureFrame, FeatureSpec, FeatureTransformer};
use crate::frame::TimeSeriesFrame;
use crate::quality::{QualityChecker, QualityReport};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: QualityReport,
    pub features: FeatureFrame,
    pub spec: FeatureSpec,
    /// `(rows, columns)` of the raw input
    pub input_shape: (usize, usize),
}

/// Paths written by [`Pipeline::persist`]
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedFiles {
    pub data: PathBuf,
    pub features: PathBuf,
    pub baseline: PathBuf,
    pub report: PathBuf,
}

/// Runs the quality gate and the feature transformer with one configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Quality checks, gate, then transform
    pub fn run(&self, frame: &TimeSeriesFrame) -> Result<PipelineOutput> {
        let mut checker = QualityChecker::new(self.config.quality.clone());
        let report = checker.run_all_checks(frame, self.config.min_rows);

        if !report.all_passed() {
            match self.config.gate {
                GateMode::Fatal => {
                    error!(issues = report.issues().len(), "Quality gate failed, aborting run");
                    return Err(StockVolError::QualityGateFailed {
                        issues: report.issues().to_vec(),
                    });
                }
                GateMode::Advisory => {
                    for issue in report.issues() {
                        warn!(issue = %issue, "Quality issue");
                    }
                    warn!("Quality gate is advisory, continuing");
                }
            }
        }

        let transformer = FeatureTransformer::new(self.config.features.clone());
        let (features, spec) = transformer.transform(frame, self.config.horizon)?;
        if features.height() == 0 {
            warn!(
                input_rows = frame.height(),
                horizon = self.config.horizon,
                "No rows survive the warm-up windows"
            );
        }

        info!(
            symbol = %self.config.symbol,
            rows = features.height(),
            features = spec.len(),
            "Pipeline run complete"
        );

        Ok(PipelineOutput {
            report,
            features,
            spec,
            input_shape: frame.shape(),
        })
    }

    /// Write outputs stamped with the current local time
    pub fn persist(&self, output: &PipelineOutput, dir: &Path) -> Result<PersistedFiles> {
        self.persist_at(output, dir, Local::now().naive_local())
    }

    /// Write the feature CSV, feature list, baseline and quality report.
    ///
    /// Files share the stem `processed_stock_data_{symbol}_{YYYYmmdd_HHMMSS}`.
    /// Nothing is written when the feature frame is empty.
    pub fn persist_at(
        &self,
        output: &PipelineOutput,
        dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<PersistedFiles> {
        if output.features.height() == 0 {
            error!(symbol = %self.config.symbol, "Refusing to persist an empty feature frame");
            return Err(StockVolError::DataError(format!(
                "No feature rows to persist from {} input rows",
                output.input_shape.0
            )));
        }

        fs::create_dir_all(dir)?;

        let stem = output_stem(&self.config.symbol, generated_at);
        let files = PersistedFiles {
            data: dir.join(format!("{}.csv", stem)),
            features: dir.join(format!("{}_features.json", stem)),
            baseline: dir.join(format!("{}_baseline.json", stem)),
            report: dir.join(format!("{}_quality_report.txt", stem)),
        };

        output.features.write_csv(&files.data)?;
        output.spec.save(&files.features)?;
        FeatureBaseline::fit(&output.features, &output.spec)?.save(&files.baseline)?;
        fs::write(
            &files.report,
            output.report.render(output.input_shape, generated_at),
        )?;

        info!(path = %files.data.display(), "Processed data saved");
        Ok(files)
    }
}

/// `processed_stock_data_{symbol}_{YYYYmmdd_HHMMSS}`
pub fn output_stem(symbol: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "processed_stock_data_{}_{}",
        symbol,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}
