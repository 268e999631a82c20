//! Fully rectangular tables: the clean price panel and the return panel.
//!
//! Cells are plain `f64`, so "every cell present" holds by construction.

use super::Ticker;
use crate::error::DataIntegrityError;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Price panel after gap repair and the completeness filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<Ticker>,
    columns: Vec<Vec<f64>>,
}

/// Log-return panel; one row shorter than the clean prices it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<Ticker>,
    columns: Vec<Vec<f64>>,
}

impl CleanPriceTable {
    /// Build a clean table. Positivity is not checked here; return
    /// derivation rejects non-positive prices.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(Ticker, Vec<f64>)>,
    ) -> Result<Self, DataIntegrityError> {
        let (tickers, columns) = split_columns(&dates, columns)?;
        Ok(Self {
            dates,
            tickers,
            columns,
        })
    }

    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        tickers: Vec<Ticker>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            dates,
            tickers,
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_cols(&self) -> usize {
        self.tickers.len()
    }

    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Ticker, &[f64])> {
        self.tickers
            .iter()
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    /// Cell value by row and column index.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }
}

impl ReturnTable {
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        tickers: Vec<Ticker>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            dates,
            tickers,
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_cols(&self) -> usize {
        self.tickers.len()
    }

    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Ticker, &[f64])> {
        self.tickers
            .iter()
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    /// Every cell, column by column.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().flat_map(|c| c.iter().copied())
    }
}

fn split_columns(
    dates: &[NaiveDate],
    columns: Vec<(Ticker, Vec<f64>)>,
) -> Result<(Vec<Ticker>, Vec<Vec<f64>>), DataIntegrityError> {
    super::price_table::validate_dates(dates)?;
    let mut seen = HashSet::with_capacity(columns.len());
    let mut tickers = Vec::with_capacity(columns.len());
    let mut cols = Vec::with_capacity(columns.len());
    for (ticker, column) in columns {
        if !seen.insert(ticker.clone()) {
            return Err(DataIntegrityError::DuplicateTicker(ticker));
        }
        if column.len() != dates.len() {
            return Err(DataIntegrityError::RaggedColumn {
                ticker,
                expected: dates.len(),
                actual: column.len(),
            });
        }
        tickers.push(ticker);
        cols.push(column);
    }
    Ok((tickers, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_table_validates_lengths() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        assert!(CleanPriceTable::new(dates.clone(), vec![("A".into(), vec![1.0, 2.0])]).is_ok());
        assert!(CleanPriceTable::new(dates, vec![("A".into(), vec![1.0])]).is_err());
    }
}
