//! Reading and writing frames through polars
//!
//! Files are laid out as a header line followed by one row per timestamp. The
//! row index is the pandas Parquet index column `__index_level_0__` when
//! present, otherwise the first column; every other column becomes a frame
//! column.

use super::{Column, TimeIndex, TimeSeriesFrame};
use crate::error::{Result, StockVolError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ndarray::Array1;
use polars::prelude::{
    Column as PlColumn, CsvReadOptions, CsvWriter, DataFrame, DataType, NamedFrom, ParquetReader,
    SerReader, SerWriter, Series,
};
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Name given to the index column when a frame is written out
pub const INDEX_COLUMN: &str = "timestamp";

/// Column pandas uses for an unnamed index in Parquet files
pub const PANDAS_INDEX_COLUMN: &str = "__index_level_0__";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a timestamp label in any of the supported layouts
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Load a frame, picking the reader from the file extension.
///
/// The index is taken from `__index_level_0__` if the file has one (pandas
/// puts it last in Parquet), otherwise from the first column.
pub fn read_frame(path: &Path) -> Result<TimeSeriesFrame> {
    let start = Instant::now();
    let df = read_polars(path)?;
    let frame = from_polars(&df)?;
    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded frame"
    );
    Ok(frame)
}

/// Load the raw polars table: Parquet for `.parquet`/`.pq`, CSV otherwise
pub fn read_polars(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    debug!(path = %path.display(), ext = %ext, "Reading table");
    match ext.as_str() {
        "parquet" | "pq" => read_parquet(path),
        _ => read_csv(path),
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn read_parquet(path: &Path) -> Result<DataFrame> {
    let df = ParquetReader::new(File::open(path)?).finish()?;
    Ok(df)
}

/// Write a frame as CSV with the index in the first column
pub fn write_csv(frame: &TimeSeriesFrame, path: &Path) -> Result<()> {
    let mut df = to_polars(frame)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    info!(path = %path.display(), rows = frame.height(), columns = frame.width(), "Wrote CSV frame");
    Ok(())
}

/// Convert a polars DataFrame into a frame.
///
/// `__index_level_0__` becomes the index wherever it sits; without it the
/// first column does.
pub fn from_polars(df: &DataFrame) -> Result<TimeSeriesFrame> {
    let all = df.get_columns();
    if all.is_empty() {
        return Err(StockVolError::DataError("Input has no columns".to_string()));
    }

    let index_pos = all
        .iter()
        .position(|col| col.name().as_str() == PANDAS_INDEX_COLUMN)
        .unwrap_or(0);
    let index = index_from_polars(&all[index_pos])?;

    let mut columns = Vec::with_capacity(all.len() - 1);
    for (i, col) in all.iter().enumerate() {
        if i != index_pos {
            columns.push((col.name().to_string(), column_from_polars(col)?));
        }
    }

    TimeSeriesFrame::new(index, columns)
}

/// Convert a frame into a polars DataFrame with a leading index column
pub fn to_polars(frame: &TimeSeriesFrame) -> Result<DataFrame> {
    let labels: Vec<String> = (0..frame.height()).map(|i| frame.index().label(i)).collect();

    let mut columns: Vec<PlColumn> = Vec::with_capacity(frame.width() + 1);
    columns.push(Series::new(INDEX_COLUMN.into(), labels).into());

    for (name, column) in frame.columns() {
        let series = match column {
            Column::Numeric(values) => {
                let cells: Vec<Option<f64>> = values
                    .iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect();
                Series::new(name.into(), cells)
            }
            Column::Text(values) => Series::new(name.into(), values.clone()),
        };
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

fn index_from_polars(col: &PlColumn) -> Result<TimeIndex> {
    let as_text = col.cast(&DataType::String)?;
    let labels: Vec<String> = as_text
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();

    let parsed: Option<Vec<NaiveDateTime>> = labels.iter().map(|l| parse_timestamp(l)).collect();
    match parsed {
        Some(ts) => Ok(TimeIndex::Timestamps(ts)),
        None => {
            debug!(column = %col.name(), "Index column is not parseable as timestamps");
            Ok(TimeIndex::Labels(labels))
        }
    }
}

fn column_from_polars(col: &PlColumn) -> Result<Column> {
    match col.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean
        | DataType::Null => {
            let casted = col.cast(&DataType::Float64)?;
            let values: Vec<f64> = casted
                .as_materialized_series()
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            Ok(Column::Numeric(Array1::from(values)))
        }
        _ => {
            let casted = col.cast(&DataType::String)?;
            let values: Vec<Option<String>> = casted
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            Ok(Column::Text(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_layouts() {
        let hourly = parse_timestamp("2024-01-01 13:00:00").unwrap();
        assert_eq!(hourly.hour(), 13);

        let iso = parse_timestamp("2024-01-01T09:30:00").unwrap();
        assert_eq!(iso.minute(), 30);

        let daily = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(daily.hour(), 0);

        let fractional = parse_timestamp("2024-01-01 00:00:00.250").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);

        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("17").is_none());
    }

    #[test]
    fn test_polars_round_trip_preserves_layout() {
        let frame = TimeSeriesFrame::from_ohlcv(
            vec![
                parse_timestamp("2024-01-01").unwrap(),
                parse_timestamp("2024-01-02").unwrap(),
            ],
            vec![1.0, 2.0],
            vec![1.5, 2.5],
            vec![0.5, 1.5],
            vec![1.2, f64::NAN],
            vec![100.0, 200.0],
        )
        .unwrap();

        let df = to_polars(&frame).unwrap();
        assert_eq!(df.width(), 6);
        assert_eq!(df.height(), 2);

        let back = from_polars(&df).unwrap();
        assert_eq!(back.column_names(), frame.column_names());
        assert_eq!(back.index(), frame.index());
        assert!(back.numeric("close").unwrap()[1].is_nan());
    }

    #[test]
    fn test_pandas_index_column_is_found_anywhere() {
        let df = DataFrame::new(vec![
            Series::new("close".into(), vec![10.0, 11.0]).into(),
            Series::new("volume".into(), vec![500.0, 600.0]).into(),
            Series::new(
                PANDAS_INDEX_COLUMN.into(),
                vec!["2024-01-01 09:00:00", "2024-01-01 10:00:00"],
            )
            .into(),
        ])
        .unwrap();

        let frame = from_polars(&df).unwrap();
        assert_eq!(frame.column_names(), vec!["close", "volume"]);
        assert_eq!(frame.index().label(1), "2024-01-01 10:00:00");
        assert!(frame.index().is_temporal());
    }

    #[test]
    fn test_first_column_is_index_by_default() {
        let df = DataFrame::new(vec![
            Series::new("date".into(), vec!["2024-01-01", "2024-01-02"]).into(),
            Series::new("close".into(), vec![10.0, 11.0]).into(),
        ])
        .unwrap();

        let frame = from_polars(&df).unwrap();
        assert_eq!(frame.column_names(), vec!["close"]);
        assert!(frame.index().is_temporal());
    }
}
