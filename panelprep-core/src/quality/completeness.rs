//! Strict-completeness filter: the last gate before the clean panel.
//!
//! Must run after gap repair, otherwise short fixable gaps would disqualify
//! columns.

use super::{Exclusion, ExclusionReason};
use crate::domain::{CleanPriceTable, PriceTable};

/// Drop every column that still has an absent cell and return the rest as a
/// fully rectangular table.
pub fn enforce_completeness(table: &PriceTable) -> (CleanPriceTable, Vec<Exclusion>) {
    let mut removed = Vec::new();
    let mut tickers = Vec::new();
    let mut columns = Vec::new();

    for (ticker, column) in table.columns() {
        let dense: Option<Vec<f64>> = column.iter().copied().collect();
        match dense {
            Some(values) => {
                tickers.push(ticker.clone());
                columns.push(values);
            }
            None => removed.push(Exclusion {
                ticker: ticker.clone(),
                reason: ExclusionReason::UnrepairableGap {
                    absent_after_repair: column.iter().filter(|v| v.is_none()).count(),
                },
            }),
        }
    }

    let clean = CleanPriceTable::from_parts(table.dates().to_vec(), tickers, columns);
    (clean, removed)
}
