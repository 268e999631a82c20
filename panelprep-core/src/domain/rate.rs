//! Risk-free rate observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading days per year used to de-annualize the risk-free rate.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One observation exactly as the rate source delivered it.
///
/// `value` is the raw text (FRED uses `"."` for a missing observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRateObservation {
    pub date: NaiveDate,
    pub value: Option<String>,
}

/// Derived observation: annualized percentage and daily-equivalent rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeObservation {
    pub date: NaiveDate,
    /// Annualized rate in percent (e.g. `5.04`).
    pub annual_pct: Option<f64>,
    /// `annual_pct / 100 / 252`.
    pub daily: Option<f64>,
}

/// Risk-free series for one rate source, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeSeries {
    pub series_id: String,
    pub observations: Vec<RiskFreeObservation>,
}

impl RiskFreeSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// First and last observation date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.observations.first()?.date, self.observations.last()?.date))
    }

    /// Most recent observation that has a numeric rate.
    pub fn latest(&self) -> Option<&RiskFreeObservation> {
        self.observations
            .iter()
            .rev()
            .find(|o| o.annual_pct.is_some())
    }

    /// Number of observations with no usable rate.
    pub fn absent_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.annual_pct.is_none())
            .count()
    }
}
