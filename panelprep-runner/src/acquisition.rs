//! Acquisition: fetch prices and the risk-free rate, then run the quality
//! pipeline.
//!
//! The two fetches are independent and run in parallel. Either failing is
//! fatal for the run; nothing downstream executes on partial data.

use crate::config::PipelineConfig;
use panelprep_core::data::{DataSource, DownloadProgress, PriceFetcher, RateFetcher};
use panelprep_core::domain::{PriceTable, RiskFreeSeries, Ticker};
use panelprep_core::error::PipelineError;
use panelprep_core::quality::{run_quality_pipeline, QualityOutcome};
use panelprep_core::rates::derive_risk_free;
use tracing::{info, warn};

/// Everything one acquisition run produced.
#[derive(Debug, Clone)]
pub struct AcquisitionResult {
    /// Tickers requested, in universe order.
    pub requested: Vec<Ticker>,
    pub raw: PriceTable,
    pub risk_free: RiskFreeSeries,
    pub outcome: QualityOutcome,
    pub price_source: DataSource,
    pub rate_source: DataSource,
}

impl AcquisitionResult {
    /// Whether any input came from a synthetic source.
    pub fn is_synthetic(&self) -> bool {
        self.price_source == DataSource::Synthetic || self.rate_source == DataSource::Synthetic
    }

    /// Tickers that returned at least one price.
    pub fn downloaded(&self) -> usize {
        self.raw
            .columns()
            .filter(|(_, c)| c.iter().any(Option::is_some))
            .count()
    }
}

/// Fetch both sources in parallel and clean the price panel.
pub fn acquire(
    tickers: &[Ticker],
    config: &PipelineConfig,
    prices: &dyn PriceFetcher,
    rates: &dyn RateFetcher,
    progress: &dyn DownloadProgress,
) -> Result<AcquisitionResult, PipelineError> {
    config.validate()?;

    let start = config.run.start_date;
    let end = config.run.end_date;
    let series_id = config.risk_free.series_id.as_str();
    info!(
        tickers = tickers.len(),
        %start,
        %end,
        price_source = prices.name(),
        rate_source = rates.name(),
        "starting acquisition"
    );

    let (price_result, rate_result) = rayon::join(
        || prices.fetch_prices(tickers, start, end, progress),
        || rates.fetch_rate(series_id, start, end),
    );
    let raw = price_result?;
    let raw_rates = rate_result?;

    info!(
        rows = raw.n_rows(),
        columns = raw.n_cols(),
        absent = raw.absent_count(),
        "price panel fetched"
    );

    let risk_free = derive_risk_free(series_id, &raw_rates);
    if risk_free.is_empty() {
        warn!(%series_id, "risk-free series has no observations in range");
    } else {
        info!(
            observations = risk_free.len(),
            absent = risk_free.absent_count(),
            "risk-free series fetched"
        );
    }

    let outcome = run_quality_pipeline(&raw, &config.quality)?;

    Ok(AcquisitionResult {
        requested: tickers.to_vec(),
        raw,
        risk_free,
        outcome,
        price_source: prices.source(),
        rate_source: rates.source(),
    })
}
