//! Structured error types for the pipeline.
//!
//! Three fatal kinds, all displayable in CLI context:
//! - [`FetchError`]: an external source (price or rate provider) failed
//! - [`DataIntegrityError`]: a table reached a stage it cannot tolerate
//! - [`ConfigurationError`]: a setting or credential is missing or malformed
//!
//! Tickers dropped by a quality threshold are *not* errors; they are recorded
//! as exclusions in the quality outcome.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure talking to an external data source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("{source_name} returned HTTP {status}: {detail}")]
    HttpStatus {
        source_name: String,
        status: u16,
        detail: String,
    },

    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data returned for any of {requested} requested tickers")]
    NoData { requested: usize },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("fetch error: {0}")]
    Other(String),
}

impl FetchError {
    /// Whether this failure is scoped to a single symbol.
    ///
    /// Symbol-scoped failures become fully-absent columns; anything else
    /// aborts the whole price fetch.
    pub fn is_symbol_scoped(&self) -> bool {
        matches!(
            self,
            FetchError::SymbolNotFound { .. }
                | FetchError::ResponseFormatChanged(_)
                | FetchError::HttpStatus { .. }
        )
    }
}

/// A structurally invalid table reached a stage that cannot tolerate it.
#[derive(Debug, Error, PartialEq)]
pub enum DataIntegrityError {
    #[error("non-positive price {price} for {ticker} on {date}")]
    NonPositivePrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("column '{ticker}' has {actual} rows, date axis has {expected}")]
    RaggedColumn {
        ticker: String,
        expected: usize,
        actual: usize,
    },

    #[error("dates are not strictly ascending at row {row} ({date})")]
    UnsortedDates { row: usize, date: NaiveDate },

    #[error("duplicate ticker column '{0}'")]
    DuplicateTicker(String),
}

/// A required setting or credential is missing or malformed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Any fatal pipeline failure. The CLI maps every variant to exit status 1.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("data integrity violation: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
