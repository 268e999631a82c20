//! Raw price table: trading dates × tickers, each cell a price or absent.
//!
//! Stored column-major because every quality stage works one ticker's time
//! series at a time. Construction enforces the structural invariants
//! (ascending dates, unique tickers, equal column lengths); completeness is
//! *not* enforced here; absences are expected in raw data.

use super::Ticker;
use crate::error::DataIntegrityError;
use chrono::NaiveDate;
use std::collections::HashSet;

/// A (possibly ragged-in-completeness) price matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<Ticker>,
    columns: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Build a table from a date axis and `(ticker, column)` pairs.
    ///
    /// Non-finite prices are normalized to absent.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(Ticker, Vec<Option<f64>>)>,
    ) -> Result<Self, DataIntegrityError> {
        validate_dates(&dates)?;

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
            let column = column
                .into_iter()
                .map(|v| v.filter(|p| p.is_finite()))
                .collect();
            tickers.push(ticker);
            cols.push(column);
        }

        Ok(Self {
            dates,
            tickers,
            columns: cols,
        })
    }

    /// A table with the given tickers and no rows.
    pub fn empty(tickers: Vec<Ticker>) -> Self {
        let columns = vec![Vec::new(); tickers.len()];
        Self {
            dates: Vec::new(),
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

    /// The time series for one ticker.
    pub fn column(&self, ticker: &str) -> Option<&[Option<f64>]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterate `(ticker, column)` in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&Ticker, &[Option<f64>])> {
        self.tickers
            .iter()
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    /// Price at `(row, ticker)`; `None` when absent or the ticker is unknown.
    pub fn get(&self, row: usize, ticker: &str) -> Option<f64> {
        self.column(ticker).and_then(|c| c.get(row).copied().flatten())
    }

    /// Number of absent cells across the whole table.
    pub fn absent_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    /// Copy of this table restricted to the tickers accepted by `keep`.
    ///
    /// Column order is preserved; the date axis is unchanged.
    pub fn select<F>(&self, mut keep: F) -> PriceTable
    where
        F: FnMut(&str, &[Option<f64>]) -> bool,
    {
        let mut tickers = Vec::new();
        let mut columns = Vec::new();
        for (ticker, column) in self.columns() {
            if keep(ticker, column) {
                tickers.push(ticker.clone());
                columns.push(column.to_vec());
            }
        }
        PriceTable {
            dates: self.dates.clone(),
            tickers,
            columns,
        }
    }

    /// Copy of this table with every column passed through `f`.
    ///
    /// `f` must return a column of the same length.
    pub(crate) fn map_columns<F>(&self, mut f: F) -> PriceTable
    where
        F: FnMut(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mapped = f(c);
                debug_assert_eq!(mapped.len(), c.len());
                mapped
            })
            .collect();
        PriceTable {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }
}

pub(crate) fn validate_dates(dates: &[NaiveDate]) -> Result<(), DataIntegrityError> {
    for (i, pair) in dates.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(DataIntegrityError::UnsortedDates {
                row: i + 1,
                date: pair[1],
            });
        }
    }
    Ok(())
}
