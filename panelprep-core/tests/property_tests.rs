//! Property tests for quality pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Rectangularity: clean tables have no absent cells, returns are finite
//! 2. Monotonic shrinkage: each filter keeps a subset of its input, in order
//! 3. Row-count law: returns have exactly one row fewer than clean prices
//! 4. Idempotence: identical input and thresholds give identical output
//! 5. Bounded fill: forward-fill never touches leading runs or long runs

use chrono::{Duration, NaiveDate};
use panelprep_core::domain::PriceTable;
use panelprep_core::quality::{forward_fill_bounded, run_quality_pipeline, QualityConfig};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_cell() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        8 => (1.0..500.0_f64).prop_map(Some),
        2 => Just(None),
    ]
}

fn arb_column(rows: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(arb_cell(), rows)
}

fn arb_table() -> impl Strategy<Value = PriceTable> {
    (2usize..40, 1usize..8).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(arb_column(rows), cols).prop_map(move |columns| {
            let base = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
            let dates = (0..rows).map(|i| base + Duration::days(i as i64)).collect();
            let named = columns
                .into_iter()
                .enumerate()
                .map(|(i, c)| (format!("T{i}"), c))
                .collect();
            PriceTable::new(dates, named).unwrap()
        })
    })
}

fn arb_config() -> impl Strategy<Value = QualityConfig> {
    (0.0..60.0_f64, 0usize..40, 0usize..6).prop_map(|(pct, days, gap)| QualityConfig {
        max_missing_pct: pct,
        min_days_required: days,
        max_consecutive_gap: gap,
        extreme_threshold: 0.5,
    })
}

// ── 1-4. Pipeline invariants ─────────────────────────────────────────

proptest! {
    /// Every surviving column is complete and every return is finite.
    #[test]
    fn clean_output_is_rectangular(raw in arb_table(), config in arb_config()) {
        let out = run_quality_pipeline(&raw, &config).unwrap();
        prop_assert_eq!(out.clean.n_rows(), raw.n_rows());
        for (_, column) in out.clean.columns() {
            prop_assert_eq!(column.len(), raw.n_rows());
            prop_assert!(column.iter().all(|p| p.is_finite() && *p > 0.0));
        }
        prop_assert!(out.returns.values().all(f64::is_finite));
    }

    /// Survivors of each stage are an order-preserving subset of the previous stage.
    #[test]
    fn filters_only_shrink(raw in arb_table(), config in arb_config()) {
        let out = run_quality_pipeline(&raw, &config).unwrap();
        prop_assert!(out.counts.after_missing_filter <= out.counts.input);
        prop_assert!(out.counts.after_history_filter <= out.counts.after_missing_filter);
        prop_assert!(out.counts.after_completeness_filter <= out.counts.after_history_filter);

        let mut raw_tickers = raw.tickers().iter();
        for ticker in out.clean.tickers() {
            prop_assert!(raw_tickers.any(|t| t == ticker));
        }
        prop_assert_eq!(
            out.clean.n_cols() + out.exclusions.len(),
            raw.n_cols()
        );
    }

    /// Returns have one row fewer than prices and share the later dates.
    #[test]
    fn return_row_count_law(raw in arb_table(), config in arb_config()) {
        let out = run_quality_pipeline(&raw, &config).unwrap();
        prop_assert_eq!(out.returns.n_rows(), out.clean.n_rows().saturating_sub(1));
        prop_assert_eq!(out.returns.tickers(), out.clean.tickers());
        if out.clean.n_rows() > 0 {
            prop_assert_eq!(out.returns.dates(), &out.clean.dates()[1..]);
        }
    }

    /// Running twice yields identical tables and exclusions.
    #[test]
    fn pipeline_idempotent(raw in arb_table(), config in arb_config()) {
        let a = run_quality_pipeline(&raw, &config).unwrap();
        let b = run_quality_pipeline(&raw, &config).unwrap();
        prop_assert_eq!(a.clean, b.clean);
        prop_assert_eq!(a.returns, b.returns);
        prop_assert_eq!(a.exclusions, b.exclusions);
    }
}

// ── 5. Bounded forward-fill ──────────────────────────────────────────

proptest! {
    /// Observed cells are never changed, leading absences never filled, and
    /// no filled cell belongs to a run longer than the limit.
    #[test]
    fn forward_fill_respects_bounds(
        column in prop::collection::vec(arb_cell(), 0..60),
        max_gap in 0usize..8,
    ) {
        let (filled, n) = forward_fill_bounded(&column, max_gap);
        prop_assert_eq!(filled.len(), column.len());

        let mut changed = 0;
        for (before, after) in column.iter().zip(&filled) {
            match before {
                Some(v) => prop_assert_eq!(after, &Some(*v)),
                None if after.is_some() => changed += 1,
                None => {}
            }
        }
        prop_assert_eq!(changed, n);

        let leading = column.iter().take_while(|c| c.is_none()).count();
        prop_assert!(filled[..leading].iter().all(Option::is_none));

        // every remaining absent run (after the leading one) is longer than max_gap
        let mut i = leading;
        while i < filled.len() {
            if filled[i].is_none() {
                let start = i;
                while i < filled.len() && filled[i].is_none() {
                    i += 1;
                }
                prop_assert!(i - start > max_gap);
            } else {
                i += 1;
            }
        }
    }
}
