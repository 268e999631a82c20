//! Risk-free rate derivation.
//!
//! Raw observations arrive as text. Anything that does not parse to a finite
//! number (FRED's `"."`, blanks, garbage) becomes an absent rate for that
//! date only; the rest of the series is unaffected. No gap filling.

use crate::domain::{RawRateObservation, RiskFreeObservation, RiskFreeSeries, TRADING_DAYS_PER_YEAR};

/// Parse a raw rate value, coercing non-numeric input to `None`.
pub fn coerce_rate(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Daily-equivalent rate: `annual_pct / 100 / 252`.
pub fn daily_rate(annual_pct: f64) -> f64 {
    annual_pct / 100.0 / TRADING_DAYS_PER_YEAR
}

/// Convert raw observations into a risk-free series, preserving order.
pub fn derive_risk_free(series_id: &str, raw: &[RawRateObservation]) -> RiskFreeSeries {
    let observations = raw
        .iter()
        .map(|obs| {
            let annual_pct = coerce_rate(obs.value.as_deref());
            RiskFreeObservation {
                date: obs.date,
                annual_pct,
                daily: annual_pct.map(daily_rate),
            }
        })
        .collect();

    RiskFreeSeries {
        series_id: series_id.to_string(),
        observations,
    }
}
