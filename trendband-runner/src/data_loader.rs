//! Price loading for the runner.
//!
//! Reads a wide CSV table (one date column, one close column per symbol)
//! into a `PriceSeries`. Empty cells and `NaN`/`null` mark a missing print;
//! forward-filling happens later in the core so the loader keeps the raw
//! gaps visible for logging.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use trendband_core::{CoreError, PriceSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("date column '{0}' not found in header")]
    MissingDateColumn(String),
    #[error("row {row}: cannot parse date '{value}'")]
    BadDate { row: usize, value: String },
    #[error("row {row}, column '{column}': cannot parse close '{value}'")]
    BadPrice {
        row: usize,
        column: String,
        value: String,
    },
    #[error("price file has no data rows")]
    Empty,
    #[error("price data rejected: {0}")]
    Series(#[from] CoreError),
}

/// Which column holds the date and how it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    pub date_column: String,
    pub date_format: String,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// A loaded table plus what was missing in it.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub series: PriceSeries,
    /// Empty cells per symbol, in column order.
    pub missing: Vec<(String, usize)>,
}

impl LoadedPrices {
    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }
}

pub fn load_prices(path: &Path, layout: &CsvLayout) -> Result<LoadedPrices, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_prices(file, layout)?;
    debug!(
        path = %path.display(),
        rows = loaded.series.len(),
        symbols = loaded.series.symbols().len(),
        missing = loaded.total_missing(),
        "loaded price table"
    );
    Ok(loaded)
}

/// Parse a wide price table from any reader.
///
/// Rows must be in ascending date order; an out-of-order or repeated date
/// is rejected as misaligned.
pub fn parse_prices<R: Read>(reader: R, layout: &CsvLayout) -> Result<LoadedPrices, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == layout.date_column)
        .ok_or_else(|| LoadError::MissingDateColumn(layout.date_column.clone()))?;
    let symbols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for (n, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = n + 2;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, &layout.date_format).map_err(|_| {
            LoadError::BadDate {
                row,
                value: raw_date.to_string(),
            }
        })?;
        let closes = symbols
            .iter()
            .map(|(i, symbol)| parse_close(record.get(*i).unwrap_or_default(), row, symbol))
            .collect::<Result<Vec<f64>, LoadError>>()?;
        rows.push((date, closes));
    }
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }

    let dates = rows.iter().map(|(d, _)| *d).collect();
    let columns: Vec<(String, Vec<f64>)> = symbols
        .iter()
        .enumerate()
        .map(|(c, (_, symbol))| (symbol.clone(), rows.iter().map(|(_, v)| v[c]).collect()))
        .collect();
    let missing = columns
        .iter()
        .map(|(s, v)| (s.clone(), v.iter().filter(|x| x.is_nan()).count()))
        .collect();

    Ok(LoadedPrices {
        series: PriceSeries::new(dates, columns)?,
        missing,
    })
}

fn parse_close(cell: &str, row: usize, column: &str) -> Result<f64, LoadError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| LoadError::BadPrice {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })
}
