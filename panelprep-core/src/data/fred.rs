//! FRED risk-free rate fetcher.
//!
//! Reads `series/observations` as JSON. Values are kept as the raw strings
//! FRED sends (`"."` marks a holiday); coercion happens in [`crate::rates`].

use super::provider::{DataSource, RateFetcher};
use crate::domain::RawRateObservation;
use crate::error::FetchError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

const SOURCE_NAME: &str = "fred";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<Observation>>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: Option<String>,
}

/// FRED observations fetcher. The API key never appears in errors or logs.
pub struct FredRateFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl FredRateFetcher {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Parse an observations body. Dates outside `[start, end)` are dropped.
    pub fn parse_response(
        body: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRateObservation>, FetchError> {
        let resp: ObservationsResponse = serde_json::from_str(body).map_err(|e| {
            FetchError::ResponseFormatChanged(format!("FRED observations: {e}"))
        })?;
        let observations = resp.observations.ok_or_else(|| {
            FetchError::ResponseFormatChanged("FRED response has no observations".into())
        })?;

        let mut out = Vec::with_capacity(observations.len());
        for obs in observations {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                FetchError::ResponseFormatChanged(format!("FRED date '{}': {e}", obs.date))
            })?;
            if date < start || date >= end {
                continue;
            }
            out.push(RawRateObservation {
                date,
                value: obs.value,
            });
        }
        out.sort_by_key(|o| o.date);
        Ok(out)
    }

    fn error_detail(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.error_message)
            .unwrap_or_else(|| "observations request failed".into())
    }
}

impl RateFetcher for FredRateFetcher {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn source(&self) -> DataSource {
        DataSource::Fred
    }

    fn fetch_rate(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRateObservation>, FetchError> {
        // FRED's observation_end is inclusive
        let last = end.pred_opt().unwrap_or(end);
        let observation_start = start.format("%Y-%m-%d").to_string();
        let observation_end = last.format("%Y-%m-%d").to_string();
        debug!(%series_id, %observation_start, %observation_end, "requesting FRED observations");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", observation_start.as_str()),
                ("observation_end", observation_end.as_str()),
            ])
            .send()
            .map_err(|e| FetchError::NetworkUnreachable(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::NetworkUnreachable(e.without_url().to_string()))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                source_name: SOURCE_NAME.into(),
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(FetchError::AuthenticationRequired(Self::error_detail(&body)));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                source_name: SOURCE_NAME.into(),
                status: status.as_u16(),
                detail: Self::error_detail(&body),
            });
        }

        Self::parse_response(&body, start, end)
    }
}
