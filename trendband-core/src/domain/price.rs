//! Aligned daily close prices for the asset basket.
//!
//! One date axis shared by every asset. Missing prints are `f64::NAN`
//! until `forward_filled()` carries the last seen close forward; only a
//! leading gap (before an asset's first print) stays NaN.

use crate::error::CoreError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    /// One column per symbol, each the same length as `dates`.
    closes: Vec<Vec<f64>>,
}

impl PriceSeries {
    /// Build a series from a date axis and `(symbol, closes)` columns.
    ///
    /// Rejects non-increasing or duplicate dates, duplicate symbols, ragged
    /// columns, and infinite prints. NaN marks a missing print.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, CoreError> {
        for pair in dates.windows(2) {
            if pair[1] == pair[0] {
                return Err(CoreError::misaligned(format!("duplicate date {}", pair[1])));
            }
            if pair[1] < pair[0] {
                return Err(CoreError::misaligned(format!(
                    "dates not ascending: {} follows {}",
                    pair[1], pair[0]
                )));
            }
        }

        let mut symbols = Vec::with_capacity(columns.len());
        let mut closes = Vec::with_capacity(columns.len());
        for (symbol, column) in columns {
            if symbols.contains(&symbol) {
                return Err(CoreError::misaligned(format!("duplicate asset column '{symbol}'")));
            }
            if column.len() != dates.len() {
                return Err(CoreError::misaligned(format!(
                    "column '{symbol}' has {} rows, date axis has {}",
                    column.len(),
                    dates.len()
                )));
            }
            if let Some((i, bad)) = column
                .iter()
                .enumerate()
                .find(|(_, v)| v.is_infinite())
            {
                return Err(CoreError::misaligned(format!(
                    "column '{symbol}' has invalid close {bad} on {}",
                    dates[i]
                )));
            }
            symbols.push(symbol);
            closes.push(column);
        }

        Ok(Self {
            dates,
            symbols,
            closes,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Close column for a symbol.
    pub fn closes(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.closes[i].as_slice())
    }

    /// Close column by position in `symbols()`.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.closes[index]
    }

    /// Restrict to the given symbols, in the given order.
    pub fn select(&self, symbols: &[&str]) -> Result<Self, CoreError> {
        let mut out_symbols = Vec::with_capacity(symbols.len());
        let mut out_closes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let column = self.closes(symbol).ok_or_else(|| {
                CoreError::misaligned(format!("no price column for asset '{symbol}'"))
            })?;
            out_symbols.push(symbol.to_string());
            out_closes.push(column.to_vec());
        }
        Ok(Self {
            dates: self.dates.clone(),
            symbols: out_symbols,
            closes: out_closes,
        })
    }

    /// Carry the last seen close forward over missing prints.
    ///
    /// Leading NaNs (before an asset's first print) are left in place.
    pub fn forward_filled(&self) -> Self {
        let closes = self
            .closes
            .iter()
            .map(|column| {
                let mut last = f64::NAN;
                column
                    .iter()
                    .map(|&v| {
                        if !v.is_nan() {
                            last = v;
                        }
                        last
                    })
                    .collect()
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            closes,
        }
    }

    /// Keep only dates on or before `date`.
    pub fn truncate_to(&self, date: NaiveDate) -> Self {
        let end = self.dates.partition_point(|d| *d <= date);
        Self {
            dates: self.dates[..end].to_vec(),
            symbols: self.symbols.clone(),
            closes: self.closes.iter().map(|c| c[..end].to_vec()).collect(),
        }
    }
}
