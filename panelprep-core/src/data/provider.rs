//! Fetcher traits for the two external sources.
//!
//! `PriceFetcher` abstracts over equity price sources (Yahoo Finance,
//! synthetic) and `RateFetcher` over risk-free rate sources (FRED,
//! synthetic), so the acquisition step can be driven by stubs in tests.

use super::align::{align_series, PricePoint};
use crate::domain::{PriceTable, RawRateObservation, Ticker};
use crate::error::FetchError;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    Fred,
    Synthetic,
}

/// Source of daily adjusted-close prices.
///
/// Date ranges are `[start, end)`.
pub trait PriceFetcher: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch one ticker's price history.
    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError>;

    /// Fetch every ticker and align them on the union of their dates.
    ///
    /// Symbols are requested in parallel. A symbol-scoped failure (unknown
    /// ticker, unparseable response) becomes a fully-absent column; any other
    /// failure aborts the call. If every ticker fails the call fails too.
    fn fetch_prices(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
        progress: &dyn DownloadProgress,
    ) -> Result<PriceTable, FetchError> {
        let total = tickers.len();
        let results: Vec<(Ticker, Result<Vec<PricePoint>, FetchError>)> = tickers
            .par_iter()
            .enumerate()
            .map(|(i, ticker)| {
                progress.on_start(ticker, i, total);
                let result = self.fetch_symbol(ticker, start, end);
                progress.on_complete(
                    ticker,
                    i,
                    total,
                    result.as_ref().map(|points| points.len()),
                );
                (ticker.clone(), result)
            })
            .collect();

        let mut series = Vec::with_capacity(total);
        let mut failed = 0;
        for (ticker, result) in results {
            match result {
                Ok(points) => series.push((ticker, points)),
                Err(e) if e.is_symbol_scoped() => {
                    warn!(ticker = %ticker, error = %e, "ticker fetch failed, column left absent");
                    failed += 1;
                    series.push((ticker, Vec::new()));
                }
                Err(e) => return Err(e),
            }
        }
        progress.on_batch_complete(total - failed, failed, total);

        if total > 0 && failed == total {
            return Err(FetchError::NoData { requested: total });
        }

        align_series(series).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Source of risk-free rate observations.
pub trait RateFetcher: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch raw observations for `series_id` over `[start, end)`, ascending.
    fn fetch_rate(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRateObservation>, FetchError>;
}

/// Progress callback for multi-symbol fetches. Called from worker threads.
pub trait DownloadProgress: Send + Sync {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes, with its observation count.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<usize, &FetchError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<usize, &FetchError>) {
        match result {
            Ok(n) => println!("  [{}/{}] OK: {symbol} ({n} days)", index + 1, total),
            Err(e) => println!("  [{}/{}] FAIL: {symbol}: {e}", index + 1, total),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\n  Download complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that discards everything.
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _index: usize, _total: usize, _result: Result<usize, &FetchError>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFetcher {
        data: HashMap<String, Result<Vec<PricePoint>, fn() -> FetchError>>,
    }

    impl PriceFetcher for MapFetcher {
        fn name(&self) -> &str {
            "map"
        }

        fn source(&self) -> DataSource {
            DataSource::YahooFinance
        }

        fn fetch_symbol(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PricePoint>, FetchError> {
            match self.data.get(symbol) {
                Some(Ok(points)) => Ok(points.clone()),
                Some(Err(make)) => Err(make()),
                None => Err(FetchError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }),
            }
        }
    }

    fn network_down() -> FetchError {
        FetchError::NetworkUnreachable("connection refused".into())
    }

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close: Some(close),
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
    }

    #[test]
    fn unknown_symbol_becomes_absent_column() {
        let mut data = HashMap::new();
        data.insert("SPY".to_string(), Ok(vec![point(2, 1.0), point(3, 2.0)]));
        let fetcher = MapFetcher { data };
        let (start, end) = range();

        let table = fetcher
            .fetch_prices(&["SPY".into(), "GONE".into()], start, end, &NoProgress)
            .unwrap();

        assert_eq!(table.tickers(), &["SPY".to_string(), "GONE".to_string()]);
        assert_eq!(table.n_rows(), 2);
        assert!(table.column("GONE").unwrap().iter().all(|v| v.is_none()));
    }

    #[test]
    fn network_failure_aborts() {
        let mut data: HashMap<String, Result<Vec<PricePoint>, fn() -> FetchError>> = HashMap::new();
        data.insert("SPY".to_string(), Ok(vec![point(2, 1.0)]));
        data.insert("QQQ".to_string(), Err(network_down as fn() -> FetchError));
        let fetcher = MapFetcher { data };
        let (start, end) = range();

        let err = fetcher
            .fetch_prices(&["SPY".into(), "QQQ".into()], start, end, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, FetchError::NetworkUnreachable(_)));
    }

    #[test]
    fn all_tickers_failing_is_no_data() {
        let fetcher = MapFetcher {
            data: HashMap::new(),
        };
        let (start, end) = range();
        let err = fetcher
            .fetch_prices(&["A".into(), "B".into()], start, end, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, FetchError::NoData { requested: 2 }));
    }
}
