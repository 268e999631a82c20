//! Artifact export: CSV tables, the text report and a JSON manifest.
//!
//! Every file is written to `<name>.tmp` and renamed into place, so a crash
//! mid-write never leaves a truncated artifact behind. Floats are written in
//! shortest round-trip form; identical inputs give byte-identical tables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use panelprep_core::data::DataSource;
use panelprep_core::domain::{CleanPriceTable, PriceTable, ReturnTable, RiskFreeSeries, TableHash};
use panelprep_core::quality::QualityConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::acquisition::AcquisitionResult;
use crate::config::PipelineConfig;
use crate::report::QualityReport;

pub const RAW_PRICES: &str = "raw_prices.csv";
pub const CLEAN_PRICES: &str = "clean_prices.csv";
pub const CLEAN_RETURNS: &str = "clean_returns.csv";
pub const RISK_FREE_RATE: &str = "risk_free_rate.csv";
pub const STOCK_UNIVERSE: &str = "stock_universe.csv";
pub const QUALITY_REPORT: &str = "data_quality_report.txt";
pub const MANIFEST: &str = "manifest.json";

/// Every artifact a run writes, in write order.
pub const ARTIFACT_FILES: [&str; 7] = [
    RAW_PRICES,
    CLEAN_PRICES,
    CLEAN_RETURNS,
    RISK_FREE_RATE,
    STOCK_UNIVERSE,
    QUALITY_REPORT,
    MANIFEST,
];

// ─── CSV export ─────────────────────────────────────────────────────

/// Raw price table: `Date,<ticker>...`, absent cells empty.
pub fn prices_csv(table: &PriceTable) -> Result<String> {
    let columns: Vec<&[Option<f64>]> = table.columns().map(|(_, c)| c).collect();
    matrix_csv(table.dates(), table.tickers(), |row, col| {
        columns[col][row].map(fmt_f64).unwrap_or_default()
    })
}

/// Clean price table: `Date,<ticker>...`.
pub fn clean_prices_csv(table: &CleanPriceTable) -> Result<String> {
    matrix_csv(table.dates(), table.tickers(), |row, col| {
        fmt_f64(table.value(row, col))
    })
}

/// Log-return table: `Date,<ticker>...`.
pub fn returns_csv(table: &ReturnTable) -> Result<String> {
    matrix_csv(table.dates(), table.tickers(), |row, col| {
        fmt_f64(table.value(row, col))
    })
}

fn matrix_csv(
    dates: &[NaiveDate],
    tickers: &[String],
    cell: impl Fn(usize, usize) -> String,
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(tickers.len() + 1);
    header.push("Date");
    header.extend(tickers.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (row, date) in dates.iter().enumerate() {
        let mut record = Vec::with_capacity(tickers.len() + 1);
        record.push(date.to_string());
        record.extend((0..tickers.len()).map(|col| cell(row, col)));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Risk-free series: `date,rf_rate,rf_rate_daily`, absent rates empty.
pub fn risk_free_csv(series: &RiskFreeSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "rf_rate", "rf_rate_daily"])?;
    for obs in &series.observations {
        wtr.write_record([
            obs.date.to_string(),
            obs.annual_pct.map(fmt_f64).unwrap_or_default(),
            obs.daily.map(fmt_f64).unwrap_or_default(),
        ])?;
    }
    finish(wtr)
}

/// One row per fetched ticker: `ticker,included,missing_pct,reason`.
pub fn universe_csv(result: &AcquisitionResult) -> Result<String> {
    let outcome = &result.outcome;
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "included", "missing_pct", "reason"])?;
    for (ticker, missing_pct) in outcome.profile.iter() {
        let included = outcome.clean.column(ticker).is_some();
        let reason = outcome
            .exclusion(ticker)
            .map(|e| e.reason.to_string())
            .unwrap_or_default();
        wtr.write_record([
            ticker.clone(),
            included.to_string(),
            format!("{missing_pct:.4}"),
            reason,
        ])?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn fmt_f64(v: f64) -> String {
    format!("{v}")
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Provenance of one run. Table hashes let two runs be compared without
/// diffing the CSVs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: NaiveDateTime,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_source: DataSource,
    pub rate_source: DataSource,
    pub synthetic: bool,
    pub risk_free_series: String,
    pub tickers_requested: usize,
    pub tickers_clean: usize,
    pub trading_days: usize,
    pub quality: QualityConfig,
    pub clean_prices_hash: TableHash,
    pub returns_hash: TableHash,
    pub files: Vec<String>,
}

impl RunManifest {
    pub fn build(
        result: &AcquisitionResult,
        config: &PipelineConfig,
        generated_at: NaiveDateTime,
    ) -> Self {
        let outcome = &result.outcome;
        Self {
            generated_at,
            start_date: config.run.start_date,
            end_date: config.run.end_date,
            price_source: result.price_source,
            rate_source: result.rate_source,
            synthetic: result.is_synthetic(),
            risk_free_series: result.risk_free.series_id.clone(),
            tickers_requested: result.requested.len(),
            tickers_clean: outcome.clean.n_cols(),
            trading_days: outcome.returns.n_rows(),
            quality: config.quality.clone(),
            clean_prices_hash: TableHash::of_prices(&outcome.clean),
            returns_hash: TableHash::of_returns(&outcome.returns),
            files: ARTIFACT_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load a manifest written by a previous run.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&json).context("Failed to parse run manifest")
    }
}

// ─── Artifact writer ────────────────────────────────────────────────

/// Paths of every file written.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub raw_prices: PathBuf,
    pub clean_prices: PathBuf,
    pub clean_returns: PathBuf,
    pub risk_free_rate: PathBuf,
    pub stock_universe: PathBuf,
    pub quality_report: PathBuf,
    pub manifest: PathBuf,
}

/// Writes a run's artifacts into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all artifacts for a completed run.
    pub fn write_all(
        &self,
        result: &AcquisitionResult,
        report: &QualityReport,
        manifest: &RunManifest,
    ) -> Result<ArtifactPaths> {
        let outcome = &result.outcome;

        let paths = ArtifactPaths {
            raw_prices: self.write(RAW_PRICES, &prices_csv(&result.raw)?)?,
            clean_prices: self.write(CLEAN_PRICES, &clean_prices_csv(&outcome.clean)?)?,
            clean_returns: self.write(CLEAN_RETURNS, &returns_csv(&outcome.returns)?)?,
            risk_free_rate: self.write(RISK_FREE_RATE, &risk_free_csv(&result.risk_free)?)?,
            stock_universe: self.write(STOCK_UNIVERSE, &universe_csv(result)?)?,
            quality_report: self.write(QUALITY_REPORT, &report.render())?,
            manifest: self.write(
                MANIFEST,
                &serde_json::to_string_pretty(manifest)
                    .context("Failed to serialize run manifest")?,
            )?,
        };

        info!(dir = %self.output_dir.display(), files = ARTIFACT_FILES.len(), "artifacts written");
        Ok(paths)
    }

    /// Write `contents` to `<output_dir>/<name>` via a temporary file.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        let tmp = self.output_dir.join(format!("{name}.tmp"));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(path)
    }
}
