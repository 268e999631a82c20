//! Data quality report: derived once from an acquisition result, rendered
//! to plain text.

use crate::acquisition::AcquisitionResult;
use crate::config::PipelineConfig;
use chrono::{NaiveDate, NaiveDateTime};
use panelprep_core::domain::{ReturnTable, RiskFreeSeries, Ticker};
use panelprep_core::quality::{QualityConfig, StageCounts};
use serde::{Deserialize, Serialize};

/// Cross-sectional statistics of the return panel.
///
/// Statistics are `None` when the panel has no rows (or, for volatility,
/// fewer than two rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub rows: usize,
    pub columns: usize,
    /// Mean over tickers of each ticker's mean daily log return.
    pub mean_daily_return: Option<f64>,
    /// Mean over tickers of each ticker's sample standard deviation.
    pub mean_daily_volatility: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub extreme_count: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ReturnsSummary {
    pub fn compute(returns: &ReturnTable, extreme_count: usize) -> Self {
        let rows = returns.n_rows();
        let columns = returns.n_cols();

        let column_means: Vec<f64> = returns
            .columns()
            .filter(|(_, c)| !c.is_empty())
            .map(|(_, c)| mean(c))
            .collect();
        let column_stds: Vec<f64> = returns
            .columns()
            .filter(|(_, c)| c.len() >= 2)
            .map(|(_, c)| sample_std(c))
            .collect();

        let min = returns.values().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.min(v)))
        });
        let max = returns.values().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        });

        let date_range = match (returns.dates().first(), returns.dates().last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        };

        Self {
            rows,
            columns,
            mean_daily_return: (!column_means.is_empty()).then(|| mean(&column_means)),
            mean_daily_volatility: (!column_stds.is_empty()).then(|| mean(&column_stds)),
            min,
            max,
            extreme_count,
            date_range,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Risk-free series at a glance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeSummary {
    pub series_id: String,
    pub observations: usize,
    pub absent: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub latest_annual_pct: Option<f64>,
}

impl RiskFreeSummary {
    pub fn compute(series: &RiskFreeSeries) -> Self {
        Self {
            series_id: series.series_id.clone(),
            observations: series.len(),
            absent: series.absent_count(),
            date_range: series.date_range(),
            latest_annual_pct: series.latest().and_then(|o| o.annual_pct),
        }
    }
}

/// A ticker that is not in the clean panel, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedTicker {
    pub ticker: Ticker,
    pub reason: String,
}

/// Immutable summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub generated_at: NaiveDateTime,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub synthetic: bool,
    pub initial_tickers: usize,
    pub downloaded: usize,
    pub thresholds: QualityConfig,
    pub counts: StageCounts,
    pub cells_repaired: usize,
    /// Absent share of the raw panel, in percent.
    pub raw_missing_pct: Option<f64>,
    pub over_5_pct_missing: usize,
    pub over_10_pct_missing: usize,
    pub trading_days: usize,
    pub returns: ReturnsSummary,
    /// Sorted by ticker.
    pub removed: Vec<RemovedTicker>,
    pub risk_free: RiskFreeSummary,
    pub files: Vec<String>,
}

impl QualityReport {
    pub fn build(
        result: &AcquisitionResult,
        config: &PipelineConfig,
        generated_at: NaiveDateTime,
        files: Vec<String>,
    ) -> Self {
        let outcome = &result.outcome;
        let raw = &result.raw;

        let cells = raw.n_rows() * raw.n_cols();
        let raw_missing_pct =
            (cells > 0).then(|| raw.absent_count() as f64 * 100.0 / cells as f64);

        let mut removed: Vec<RemovedTicker> = result
            .requested
            .iter()
            .filter(|t| outcome.clean.column(t).is_none())
            .map(|t| RemovedTicker {
                ticker: t.clone(),
                reason: outcome
                    .exclusion(t)
                    .map(|e| e.reason.to_string())
                    .unwrap_or_else(|| "Not returned by source".into()),
            })
            .collect();
        removed.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        Self {
            generated_at,
            start_date: config.run.start_date,
            end_date: config.run.end_date,
            synthetic: result.is_synthetic(),
            initial_tickers: result.requested.len(),
            downloaded: result.downloaded(),
            thresholds: config.quality.clone(),
            counts: outcome.counts,
            cells_repaired: outcome.cells_repaired,
            raw_missing_pct,
            over_5_pct_missing: outcome.profile.count_above(5.0),
            over_10_pct_missing: outcome.profile.count_above(10.0),
            trading_days: outcome.returns.n_rows(),
            returns: ReturnsSummary::compute(&outcome.returns, outcome.outliers.total),
            removed,
            risk_free: RiskFreeSummary::compute(&result.risk_free),
            files,
        }
    }

    /// Stocks in the clean panel.
    pub fn passing(&self) -> usize {
        self.counts.after_completeness_filter
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut report = String::new();
        let mut line = |text: String| {
            report.push_str(&text);
            report.push('\n');
        };

        line("DATA QUALITY REPORT".into());
        line(format!(
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        line(rule.clone());
        if self.synthetic {
            line("WARNING: synthetic data; not for analysis".into());
        }

        let t = &self.thresholds;
        line(String::new());
        line("DOWNLOAD PARAMETERS:".into());
        line(format!(
            "  Date range: {} to {} (end exclusive)",
            self.start_date, self.end_date
        ));
        line(format!("  Initial tickers: {}", self.initial_tickers));
        line(format!("  Max missing: {:.2}%", t.max_missing_pct));
        line(format!("  Min history: {} days", t.min_days_required));
        line(format!("  Max repairable gap: {} days", t.max_consecutive_gap));
        line(format!("  Extreme return threshold: {}", t.extreme_threshold));

        let c = &self.counts;
        line(String::new());
        line("DATA QUALITY SUMMARY:".into());
        line(format!("  Stocks downloaded: {}", self.downloaded));
        line(format!("  Stocks with >5% missing: {}", self.over_5_pct_missing));
        line(format!("  Stocks with >10% missing: {}", self.over_10_pct_missing));
        line(format!("  After missing-data filter: {}", c.after_missing_filter));
        line(format!("  After minimum-history filter: {}", c.after_history_filter));
        line(format!("  After completeness filter: {}", c.after_completeness_filter));
        line(format!("  Stocks passing quality checks: {}", self.passing()));
        line(format!("  Stocks removed: {}", self.removed.len()));
        line(format!("  Gap cells forward-filled: {}", self.cells_repaired));
        line(format!("  Trading days available: {}", self.trading_days));
        line(format!(
            "  Overall missing data (raw): {}",
            fmt_opt(self.raw_missing_pct, |v| format!("{v:.2}%"))
        ));

        let r = &self.returns;
        line(String::new());
        line("RETURNS STATISTICS:".into());
        line(format!("  Shape: ({}, {})", r.rows, r.columns));
        line(format!("  Date range: {}", fmt_range(r.date_range)));
        line(format!(
            "  Mean daily return: {}",
            fmt_opt(r.mean_daily_return, |v| format!("{:.4}%", v * 100.0))
        ));
        line(format!(
            "  Mean daily volatility: {}",
            fmt_opt(r.mean_daily_volatility, |v| format!("{:.2}%", v * 100.0))
        ));
        line(format!(
            "  Min daily return: {}",
            fmt_opt(r.min, |v| format!("{:.2}%", v * 100.0))
        ));
        line(format!(
            "  Max daily return: {}",
            fmt_opt(r.max, |v| format!("{:.2}%", v * 100.0))
        ));
        line(format!(
            "  Extreme returns (|r| > {}): {}",
            t.extreme_threshold, r.extreme_count
        ));

        line(String::new());
        line("REMOVED STOCKS:".into());
        if self.removed.is_empty() {
            line("  None".into());
        }
        for removed in &self.removed {
            line(format!("  {}: {}", removed.ticker, removed.reason));
        }

        let rf = &self.risk_free;
        line(String::new());
        line(format!("RISK-FREE RATE ({}):", rf.series_id));
        line(format!(
            "  Observations: {} ({} absent)",
            rf.observations, rf.absent
        ));
        line(format!("  Date range: {}", fmt_range(rf.date_range)));
        line(format!(
            "  Latest rate: {}",
            fmt_opt(rf.latest_annual_pct, |v| format!("{v:.2}%"))
        ));

        line(String::new());
        line("FILES CREATED:".into());
        for file in &self.files {
            line(format!("  {file}"));
        }

        line(String::new());
        line(rule.clone());
        line("DATA ACQUISITION COMPLETE".into());
        line(rule);
        report
    }
}

fn fmt_opt(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| "n/a".into())
}

fn fmt_range(range: Option<(NaiveDate, NaiveDate)>) -> String {
    range
        .map(|(a, b)| format!("{a} to {b}"))
        .unwrap_or_else(|| "n/a".into())
}
