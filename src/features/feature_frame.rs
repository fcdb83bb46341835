//! Transformer output with no undefined cells

use super::spec::FeatureSpec;
use crate::error::{Result, StockVolError};
use crate::frame::{io, TimeSeriesFrame};
use ndarray::{Array1, Array2};
use std::path::Path;

/// A frame whose every cell is defined and finite
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    inner: TimeSeriesFrame,
}

impl FeatureFrame {
    /// Drop incomplete rows and wrap the result
    pub(crate) fn finalize(frame: TimeSeriesFrame) -> Self {
        Self {
            inner: frame.drop_undefined_rows(),
        }
    }

    pub fn frame(&self) -> &TimeSeriesFrame {
        &self.inner
    }

    pub fn into_inner(self) -> TimeSeriesFrame {
        self.inner
    }

    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// Rows by spec columns, in spec order
    pub fn design_matrix(&self, spec: &FeatureSpec) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((self.height(), spec.len()));

        for (j, name) in spec.names().iter().enumerate() {
            let values = self.numeric_column(name)?;
            matrix.column_mut(j).assign(values);
        }

        Ok(matrix)
    }

    /// Copy of a numeric column, feature or target
    pub fn column(&self, name: &str) -> Result<Array1<f64>> {
        self.numeric_column(name).map(Clone::clone)
    }

    /// Write as CSV with a leading `timestamp` column
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        io::write_csv(&self.inner, path)
    }

    fn numeric_column(&self, name: &str) -> Result<&Array1<f64>> {
        match self.inner.column(name) {
            None => Err(StockVolError::FeatureNotFound(name.to_string())),
            Some(column) => column
                .as_numeric()
                .ok_or_else(|| StockVolError::NonNumericColumn(name.to_string())),
        }
    }
}
