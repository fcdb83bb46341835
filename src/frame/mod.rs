//! Time-indexed tabular frame
//!
//! [`TimeSeriesFrame`] is the in-memory table the quality checker and the
//! feature transformer operate on. Rows are keyed by a [`TimeIndex`]; columns
//! are either numeric (missing cells are NaN) or text (missing cells are
//! `None`). Column order is insertion order and is preserved on replacement.

pub mod io;

use crate::error::{Result, StockVolError};
use chrono::NaiveDateTime;
use ndarray::Array1;
use std::collections::HashSet;

/// Columns every raw OHLCV frame is expected to carry
pub const OHLCV_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Price columns that must never be negative
pub const PRICE_COLUMNS: [&str; 4] = ["open", "high", "low", "close"];

/// Format used when a timestamp index is rendered as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Row index of a frame
#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    /// Parsed timestamps, one per row
    Timestamps(Vec<NaiveDateTime>),
    /// Raw labels that could not be interpreted as timestamps
    Labels(Vec<String>),
}

impl TimeIndex {
    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Timestamps(ts) => ts.len(),
            TimeIndex::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the index holds timestamps
    pub fn is_temporal(&self) -> bool {
        matches!(self, TimeIndex::Timestamps(_))
    }

    /// Timestamps, if this is a temporal index
    pub fn timestamps(&self) -> Option<&[NaiveDateTime]> {
        match self {
            TimeIndex::Timestamps(ts) => Some(ts),
            TimeIndex::Labels(_) => None,
        }
    }

    /// Text rendering of the row at `i`
    pub fn label(&self, i: usize) -> String {
        match self {
            TimeIndex::Timestamps(ts) => ts[i].format(TIMESTAMP_FORMAT).to_string(),
            TimeIndex::Labels(labels) => labels[i].clone(),
        }
    }

    fn select(&self, keep: &[bool]) -> Self {
        match self {
            TimeIndex::Timestamps(ts) => TimeIndex::Timestamps(select_rows(ts, keep)),
            TimeIndex::Labels(labels) => TimeIndex::Labels(select_rows(labels, keep)),
        }
    }
}

/// A single frame column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values; NaN marks a missing cell
    Numeric(Array1<f64>),
    /// Text values; `None` marks a missing cell
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&Array1<f64>> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Text(_) => None,
        }
    }

    /// Number of missing cells (NaN or `None`)
    pub fn null_count(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
            Column::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// A cell is defined when it is present and, if numeric, finite
    pub fn is_defined(&self, row: usize) -> bool {
        match self {
            Column::Numeric(values) => values[row].is_finite(),
            Column::Text(values) => values[row].is_some(),
        }
    }

    fn select(&self, keep: &[bool]) -> Self {
        match self {
            Column::Numeric(values) => {
                let kept: Vec<f64> = values
                    .iter()
                    .zip(keep)
                    .filter_map(|(v, &k)| k.then_some(*v))
                    .collect();
                Column::Numeric(Array1::from(kept))
            }
            Column::Text(values) => Column::Text(select_rows(values, keep)),
        }
    }
}

impl From<Array1<f64>> for Column {
    fn from(values: Array1<f64>) -> Self {
        Column::Numeric(values)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Numeric(Array1::from(values))
    }
}

fn select_rows<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter_map(|(v, &k)| k.then(|| v.clone()))
        .collect()
}

/// Ordered, time-indexed table of named columns
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    index: TimeIndex,
    columns: Vec<(String, Column)>,
}

impl TimeSeriesFrame {
    /// Build a frame, checking that every column matches the index length and
    /// that column names are unique
    pub fn new(index: TimeIndex, columns: Vec<(String, Column)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(StockVolError::ValidationError(format!(
                    "Duplicate column name '{}'",
                    name
                )));
            }
            if column.len() != index.len() {
                return Err(StockVolError::ShapeError {
                    expected: format!("{} rows in column '{}'", index.len(), name),
                    actual: format!("{} rows", column.len()),
                });
            }
        }

        Ok(Self { index, columns })
    }

    /// Build a raw OHLCV frame from parallel vectors
    pub fn from_ohlcv(
        timestamps: Vec<NaiveDateTime>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self> {
        Self::new(
            TimeIndex::Timestamps(timestamps),
            vec![
                ("open".to_string(), open.into()),
                ("high".to_string(), high.into()),
                ("low".to_string(), low.into()),
                ("close".to_string(), close.into()),
                ("volume".to_string(), volume.into()),
            ],
        )
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of columns, excluding the index
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Numeric values of a column, if it exists and is numeric
    pub fn numeric(&self, name: &str) -> Option<&Array1<f64>> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Mutable numeric values of a column
    pub fn numeric_mut(&mut self, name: &str) -> Option<&mut Array1<f64>> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .and_then(|(_, column)| match column {
                Column::Numeric(values) => Some(values),
                Column::Text(_) => None,
            })
    }

    /// Insert a column, replacing an existing one with the same name in place
    pub fn set_column(&mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<()> {
        let name = name.into();
        let column = column.into();

        if column.len() != self.height() {
            return Err(StockVolError::ShapeError {
                expected: format!("{} rows in column '{}'", self.height(), name),
                actual: format!("{} rows", column.len()),
            });
        }

        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Builder form of [`set_column`](Self::set_column)
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<Self> {
        self.set_column(name, column)?;
        Ok(self)
    }

    /// Total missing cells across all columns
    pub fn null_count(&self) -> usize {
        self.columns.iter().map(|(_, column)| column.null_count()).sum()
    }

    /// Whether every cell of the row is defined
    pub fn row_is_defined(&self, row: usize) -> bool {
        self.columns.iter().all(|(_, column)| column.is_defined(row))
    }

    /// Drop every row containing a missing or non-finite cell
    pub fn drop_undefined_rows(&self) -> Self {
        let keep: Vec<bool> = (0..self.height()).map(|row| self.row_is_defined(row)).collect();
        Self {
            index: self.index.select(&keep),
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.select(&keep)))
                .collect(),
        }
    }
}
