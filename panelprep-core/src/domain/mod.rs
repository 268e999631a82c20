//! Domain types: price tables, return tables, risk-free observations.

pub mod dense_table;
pub mod ids;
pub mod price_table;
pub mod rate;

pub use dense_table::{CleanPriceTable, ReturnTable};
pub use ids::TableHash;
pub use price_table::PriceTable;
pub use rate::{RawRateObservation, RiskFreeObservation, RiskFreeSeries, TRADING_DAYS_PER_YEAR};

/// Ticker symbol. Opaque; only equality is interpreted.
pub type Ticker = String;
