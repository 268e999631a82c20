//! Data quality pipeline: raw price table in, clean prices and log returns out.
//!
//! Stage order is fixed and matters:
//! 1. missing-data filter (missingness computed once, over the full raw range)
//! 2. minimum-history filter (observed cells before any filling)
//! 3. bounded forward-fill of short gaps
//! 4. strict completeness: any remaining absence drops the column
//! 5. log returns
//! 6. extreme-return count (diagnostic only)
//!
//! Every stage borrows its input and returns a new table, so the pipeline is
//! deterministic and the raw table stays available for persistence.

pub mod completeness;
pub mod gap_fill;
pub mod history;
pub mod missing;
pub mod outliers;
pub mod returns;

pub use completeness::enforce_completeness;
pub use gap_fill::{forward_fill_bounded, repair_gaps, GapRepairOutput};
pub use history::filter_history;
pub use missing::{filter_missing, MissingFilterOutput, MissingnessProfile};
pub use outliers::{count_extreme_returns, OutlierSummary};
pub use returns::derive_log_returns;

use crate::domain::{CleanPriceTable, PriceTable, ReturnTable, Ticker};
use crate::error::DataIntegrityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Quality thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Tickers with missingness strictly above this percentage are dropped.
    pub max_missing_pct: f64,
    /// Minimum observed prices (before gap filling) a ticker needs.
    pub min_days_required: usize,
    /// Longest run of absent cells that forward-fill may repair.
    pub max_consecutive_gap: usize,
    /// Absolute log return above which a cell is counted as extreme.
    pub extreme_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            max_missing_pct: 5.0,
            min_days_required: 1200,
            max_consecutive_gap: 5,
            extreme_threshold: 0.5,
        }
    }
}

/// Why a ticker did not make it into the clean panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ExclusionReason {
    ExcessiveMissing { missing_pct: f64, threshold_pct: f64 },
    InsufficientHistory { observed: usize, required: usize },
    UnrepairableGap { absent_after_repair: usize },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::ExcessiveMissing {
                missing_pct,
                threshold_pct,
            } => write!(f, "Missing data {missing_pct:.2}% > {threshold_pct:.2}%"),
            ExclusionReason::InsufficientHistory { observed, required } => {
                write!(f, "Insufficient history: {observed} < {required} days")
            }
            ExclusionReason::UnrepairableGap {
                absent_after_repair,
            } => write!(
                f,
                "Unrepairable gap: {absent_after_repair} cells still missing after forward-fill"
            ),
        }
    }
}

/// A ticker removed by one of the filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub ticker: Ticker,
    pub reason: ExclusionReason,
}

/// Surviving column counts after each filtering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub input: usize,
    pub after_missing_filter: usize,
    pub after_history_filter: usize,
    pub after_completeness_filter: usize,
}

/// Everything the pipeline produced.
#[derive(Debug, Clone)]
pub struct QualityOutcome {
    pub profile: MissingnessProfile,
    pub clean: CleanPriceTable,
    pub returns: ReturnTable,
    /// Removed tickers in stage order.
    pub exclusions: Vec<Exclusion>,
    pub counts: StageCounts,
    pub cells_repaired: usize,
    pub outliers: OutlierSummary,
}

impl QualityOutcome {
    /// Exclusion record for a ticker, if it was removed.
    pub fn exclusion(&self, ticker: &str) -> Option<&Exclusion> {
        self.exclusions.iter().find(|e| e.ticker == ticker)
    }
}

/// Run every stage in order.
///
/// Threshold exclusions are recorded, never raised. The only error is a
/// structurally invalid clean table reaching return derivation.
pub fn run_quality_pipeline(
    raw: &PriceTable,
    config: &QualityConfig,
) -> Result<QualityOutcome, DataIntegrityError> {
    let input = raw.n_cols();

    let MissingFilterOutput {
        table,
        profile,
        removed: mut exclusions,
    } = filter_missing(raw, config.max_missing_pct);
    let after_missing_filter = table.n_cols();
    info!(
        removed = input - after_missing_filter,
        retained = after_missing_filter,
        threshold_pct = config.max_missing_pct,
        "missing-data filter"
    );

    let (table, removed) = filter_history(&table, config.min_days_required);
    exclusions.extend(removed);
    let after_history_filter = table.n_cols();
    info!(
        retained = after_history_filter,
        min_days = config.min_days_required,
        "minimum-history filter"
    );

    let GapRepairOutput {
        table,
        cells_repaired,
    } = repair_gaps(&table, config.max_consecutive_gap);
    info!(cells_repaired, max_gap = config.max_consecutive_gap, "gap repair");

    let (clean, removed) = enforce_completeness(&table);
    exclusions.extend(removed);
    let after_completeness_filter = clean.n_cols();
    info!(
        retained = after_completeness_filter,
        rows = clean.n_rows(),
        "completeness filter"
    );

    let returns = derive_log_returns(&clean)?;
    let outliers = count_extreme_returns(&returns, config.extreme_threshold);
    if outliers.total > 0 {
        warn!(
            count = outliers.total,
            threshold = config.extreme_threshold,
            "extreme returns detected"
        );
    }

    Ok(QualityOutcome {
        profile,
        clean,
        returns,
        exclusions,
        counts: StageCounts {
            input,
            after_missing_filter,
            after_history_filter,
            after_completeness_filter,
        },
        cells_repaired,
        outliers,
    })
}
