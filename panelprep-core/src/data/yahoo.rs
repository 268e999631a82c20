//! Yahoo Finance price fetcher.
//!
//! Fetches daily adjusted closes from Yahoo's v8 chart API, one request per
//! ticker. Each ticker gets exactly one attempt; failures are classified so
//! the caller can tell a bad symbol from an unreachable service.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::align::PricePoint;
use super::provider::{DataSource, PriceFetcher};
use crate::error::FetchError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

const SOURCE_NAME: &str = "yahoo_finance";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price fetcher.
pub struct YahooPriceFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooPriceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Yahoo spells share classes with a dash (`BRK-B`).
    pub fn yahoo_symbol(symbol: &str) -> String {
        symbol.replace('.', "-")
    }

    /// Build the chart API URL for a symbol and `[start, end)` range.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!(
            "{}/{}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            self.base_url,
            Self::yahoo_symbol(symbol)
        )
    }

    /// Parse a chart API response body into price points.
    ///
    /// Uses the adjusted close where present and falls back to the raw
    /// close. Rows with neither are skipped; dates outside `[start, end)`
    /// are dropped.
    pub fn parse_response(
        symbol: &str,
        body: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            FetchError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(FetchError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(FetchError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(FetchError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("result array is empty".into()))?;

        // Listed symbols with nothing in range come back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        };

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    FetchError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
            if date < start || date >= end {
                continue;
            }

            let adj = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());
            let close = adj.or_else(|| closes.get(i).copied().flatten());

            // Holidays and halted sessions come back as all-null rows
            if close.is_none() {
                continue;
            }

            points.push(PricePoint { date, close });
        }

        if points.is_empty() {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(points)
    }

    fn fetch_once(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let url = self.chart_url(symbol, start, end);
        debug!(%symbol, %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::NetworkUnreachable(e.without_url().to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                source_name: SOURCE_NAME.into(),
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(FetchError::AuthenticationRequired(format!(
                "Yahoo Finance returned HTTP {status}"
            )));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                source_name: SOURCE_NAME.into(),
                status: status.as_u16(),
                detail: format!("chart request for {symbol}"),
            });
        }

        let body = resp
            .text()
            .map_err(|e| FetchError::NetworkUnreachable(e.without_url().to_string()))?;
        Self::parse_response(symbol, &body, start, end)
    }
}

impl PriceFetcher for YahooPriceFetcher {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError> {
        self.fetch_once(symbol, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // 2024-01-02, 2024-01-03, 2024-01-04 at 14:30 UTC
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{"close": [185.64, null, 181.91], "open": [1, 2, 3]}],
                    "adjclose": [{"adjclose": [184.94, null, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn prefers_adjclose_falls_back_to_close() {
        let points =
            YahooPriceFetcher::parse_response("AAPL", BODY, d("2024-01-01"), d("2024-02-01"))
                .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d("2024-01-02"));
        assert_eq!(points[0].close, Some(184.94));
        // null on 01-03 is skipped, 01-04 falls back to close
        assert_eq!(points[1].date, d("2024-01-04"));
        assert_eq!(points[1].close, Some(181.91));
    }

    #[test]
    fn end_date_is_exclusive() {
        let points =
            YahooPriceFetcher::parse_response("AAPL", BODY, d("2024-01-01"), d("2024-01-04"))
                .unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn not_found_error_is_symbol_scoped() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = YahooPriceFetcher::parse_response("XXXX", body, d("2024-01-01"), d("2024-02-01"))
            .unwrap_err();
        assert!(matches!(err, FetchError::SymbolNotFound { .. }));
        assert!(err.is_symbol_scoped());
    }

    #[test]
    fn garbage_body_is_format_change() {
        let err = YahooPriceFetcher::parse_response("AAPL", "<html>", d("2024-01-01"), d("2024-02-01"))
            .unwrap_err();
        assert!(matches!(err, FetchError::ResponseFormatChanged(_)));
    }

    #[test]
    fn no_timestamps_means_no_data() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = YahooPriceFetcher::parse_response("AAPL", body, d("2024-01-01"), d("2024-02-01"))
            .unwrap_err();
        assert!(matches!(err, FetchError::SymbolNotFound { .. }));
    }

    #[test]
    fn share_class_symbol_mapping() {
        assert_eq!(YahooPriceFetcher::yahoo_symbol("BRK.B"), "BRK-B");
        assert_eq!(YahooPriceFetcher::yahoo_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn chart_url_uses_midnight_bounds() {
        let f = YahooPriceFetcher::with_base_url("http://localhost/chart/", Duration::from_secs(1))
            .unwrap();
        let url = f.chart_url("BRK.B", d("2020-01-01"), d("2020-01-02"));
        assert_eq!(
            url,
            "http://localhost/chart/BRK-B?period1=1577836800&period2=1577923200&interval=1d&includeAdjustedClose=true"
        );
    }
}
