//! Missing-data filter and the missingness profile it is based on.

use super::{Exclusion, ExclusionReason};
use crate::domain::{PriceTable, Ticker};
use serde::{Deserialize, Serialize};

/// Per-ticker absent-cell count over the full raw date range.
///
/// Computed once from the raw table and never recomputed after repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessProfile {
    total_rows: usize,
    absent: Vec<(Ticker, usize)>,
}

impl MissingnessProfile {
    pub fn compute(table: &PriceTable) -> Self {
        let absent = table
            .columns()
            .map(|(ticker, column)| {
                (
                    ticker.clone(),
                    column.iter().filter(|v| v.is_none()).count(),
                )
            })
            .collect();
        Self {
            total_rows: table.n_rows(),
            absent,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Missing percentage for one ticker, `None` if it was not in the table.
    pub fn missing_pct(&self, ticker: &str) -> Option<f64> {
        self.absent
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, n)| pct(*n, self.total_rows))
    }

    /// `(ticker, missing %)` in the raw table's column order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, f64)> {
        self.absent
            .iter()
            .map(move |(t, n)| (t, pct(*n, self.total_rows)))
    }

    /// Tickers whose missingness is strictly above `threshold_pct`.
    pub fn count_above(&self, threshold_pct: f64) -> usize {
        self.iter().filter(|(_, p)| *p > threshold_pct).count()
    }

    pub fn len(&self) -> usize {
        self.absent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.absent.is_empty()
    }
}

/// Zero rows means zero observations, i.e. fully missing.
fn pct(absent: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 100.0;
    }
    // multiply first so exact ratios such as 75/1500 land on 5.0
    (absent as f64 * 100.0) / rows as f64
}

/// Output of the missing-data filter.
#[derive(Debug, Clone)]
pub struct MissingFilterOutput {
    pub table: PriceTable,
    pub profile: MissingnessProfile,
    pub removed: Vec<Exclusion>,
}

/// Drop every ticker whose missingness exceeds `max_missing_pct`.
///
/// The comparison is strict: a ticker at exactly the threshold is kept.
/// A ticker with no observed price is always dropped, whatever the
/// threshold, and so is every ticker of a zero-row table.
pub fn filter_missing(raw: &PriceTable, max_missing_pct: f64) -> MissingFilterOutput {
    let profile = MissingnessProfile::compute(raw);

    let mut removed = Vec::new();
    let table = raw.select(|ticker, column| {
        let missing = profile.missing_pct(ticker).unwrap_or(100.0);
        let never_observed = column.iter().all(Option::is_none);
        if never_observed || missing > max_missing_pct {
            removed.push(Exclusion {
                ticker: ticker.to_string(),
                reason: ExclusionReason::ExcessiveMissing {
                    missing_pct: missing,
                    threshold_pct: max_missing_pct,
                },
            });
            false
        } else {
            true
        }
    });

    MissingFilterOutput {
        table,
        profile,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n).map(|i| base + chrono::Duration::days(i as i64)).collect()
    }

    fn column_with_absent(n: usize, absent: usize) -> Vec<Option<f64>> {
        (0..n)
            .map(|i| if i < absent { None } else { Some(100.0) })
            .collect()
    }

    #[test]
    fn exactly_at_threshold_is_retained() {
        let raw = PriceTable::new(
            dates(1500),
            vec![
                ("EDGE".into(), column_with_absent(1500, 75)), // 5.00%
                ("OVER".into(), column_with_absent(1500, 76)), // 5.07%
            ],
        )
        .unwrap();

        let out = filter_missing(&raw, 5.0);
        assert_eq!(out.table.tickers(), &["EDGE".to_string()]);
        assert_eq!(out.removed.len(), 1);
        assert_eq!(out.removed[0].ticker, "OVER");
        assert_eq!(out.profile.missing_pct("EDGE"), Some(5.0));
    }

    #[test]
    fn zero_observations_always_removed() {
        let raw = PriceTable::new(
            dates(2),
            vec![
                ("DEAD".into(), vec![None, None]),
                ("OK".into(), vec![Some(1.0), Some(1.0)]),
            ],
        )
        .unwrap();

        let out = filter_missing(&raw, 100.0);
        assert_eq!(out.profile.missing_pct("DEAD"), Some(100.0));
        assert_eq!(out.table.tickers(), &["OK".to_string()]);
        assert_eq!(
            out.removed,
            vec![Exclusion {
                ticker: "DEAD".into(),
                reason: ExclusionReason::ExcessiveMissing {
                    missing_pct: 100.0,
                    threshold_pct: 100.0,
                },
            }]
        );
    }

    #[test]
    fn zero_row_table_removes_every_ticker() {
        let raw = PriceTable::empty(vec!["A".into(), "B".into()]);
        let out = filter_missing(&raw, 100.0);
        assert_eq!(out.table.n_cols(), 0);
        assert_eq!(out.removed.len(), 2);
    }

    #[test]
    fn empty_table_reports_full_missingness() {
        let raw = PriceTable::empty(vec!["A".into()]);
        let profile = MissingnessProfile::compute(&raw);
        assert_eq!(profile.missing_pct("A"), Some(100.0));
    }

    #[test]
    fn profile_keeps_removed_tickers() {
        let raw = PriceTable::new(
            dates(10),
            vec![
                ("A".into(), column_with_absent(10, 0)),
                ("B".into(), column_with_absent(10, 5)),
            ],
        )
        .unwrap();
        let out = filter_missing(&raw, 5.0);
        assert_eq!(out.table.n_cols(), 1);
        assert_eq!(out.profile.len(), 2);
        assert_eq!(out.profile.missing_pct("B"), Some(50.0));
        assert_eq!(out.profile.count_above(10.0), 1);
    }
}
