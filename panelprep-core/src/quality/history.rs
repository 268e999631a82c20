//! Minimum-history filter.
//!
//! A ticker can pass the missingness test and still have too short a listing
//! history for downstream estimation; this stage enforces a minimum sample
//! size independently.

use super::{Exclusion, ExclusionReason};
use crate::domain::PriceTable;

/// Keep tickers with at least `min_days_required` observed prices.
///
/// Counts non-absent cells as they stand after the missing-data filter,
/// before any gap filling. Equality passes.
pub fn filter_history(table: &PriceTable, min_days_required: usize) -> (PriceTable, Vec<Exclusion>) {
    let mut removed = Vec::new();
    let kept = table.select(|ticker, column| {
        let observed = column.iter().filter(|v| v.is_some()).count();
        if observed >= min_days_required {
            true
        } else {
            removed.push(Exclusion {
                ticker: ticker.to_string(),
                reason: ExclusionReason::InsufficientHistory {
                    observed,
                    required: min_days_required,
                },
            });
            false
        }
    });
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn equal_to_threshold_passes() {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..5).map(|i| base + chrono::Duration::days(i)).collect();
        let table = PriceTable::new(
            dates,
            vec![
                ("THREE".into(), vec![None, None, Some(1.0), Some(1.0), Some(1.0)]),
                ("TWO".into(), vec![None, None, None, Some(1.0), Some(1.0)]),
            ],
        )
        .unwrap();

        let (kept, removed) = filter_history(&table, 3);
        assert_eq!(kept.tickers(), &["THREE".to_string()]);
        assert_eq!(removed.len(), 1);
        assert_eq!(
            removed[0].reason,
            ExclusionReason::InsufficientHistory {
                observed: 2,
                required: 3
            }
        );
    }
}
