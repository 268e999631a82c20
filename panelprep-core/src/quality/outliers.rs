//! Extreme-return flagging. Observational only; nothing is removed.

use crate::domain::{ReturnTable, Ticker};
use serde::{Deserialize, Serialize};

/// Count of returns whose magnitude exceeds the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub threshold: f64,
    pub total: usize,
    /// Only tickers with at least one flagged return, in column order.
    pub per_ticker: Vec<(Ticker, usize)>,
}

/// Count cells with `|r| > threshold` (strict).
pub fn count_extreme_returns(returns: &ReturnTable, threshold: f64) -> OutlierSummary {
    let per_ticker: Vec<(Ticker, usize)> = returns
        .columns()
        .map(|(ticker, column)| {
            (
                ticker.clone(),
                column.iter().filter(|r| r.abs() > threshold).count(),
            )
        })
        .filter(|(_, n)| *n > 0)
        .collect();

    OutlierSummary {
        threshold,
        total: per_ticker.iter().map(|(_, n)| n).sum(),
        per_ticker,
    }
}
