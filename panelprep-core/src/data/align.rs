//! Multi-symbol time alignment.
//!
//! Given per-symbol price series, align them to a common timeline.
//! Dates a symbol did not trade on stay absent; no filling happens here.

use crate::domain::{PriceTable, Ticker};
use crate::error::DataIntegrityError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One adjusted close for one trading date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Align multiple symbols to the union of their dates.
///
/// Column order follows the input order. A symbol with an empty series gets
/// a fully-absent column. If a series repeats a date, the first value wins.
pub fn align_series(
    series: Vec<(Ticker, Vec<PricePoint>)>,
) -> Result<PriceTable, DataIntegrityError> {
    let all_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.date))
        .collect();
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let columns = series
        .into_iter()
        .map(|(ticker, points)| {
            let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
            for p in points {
                by_date.entry(p.date).or_insert(p.close);
            }
            let column = dates
                .iter()
                .map(|d| by_date.get(d).copied().flatten())
                .collect();
            (ticker, column)
        })
        .collect();

    PriceTable::new(dates, columns)
}
