//! panelprep core: domain tables, fetchers, the data quality pipeline.
//!
//! This crate contains everything between the external data sources and a
//! clean, rectangular return panel:
//! - Domain types (raw price table, clean price table, return table, risk-free series)
//! - Error taxonomy (fetch, data integrity, configuration)
//! - Universe definition and the price/rate fetcher traits
//! - Yahoo Finance, FRED and synthetic sources
//! - The quality pipeline (missing filter, history filter, gap repair,
//!   completeness, log returns, extreme-return count)
//! - Risk-free rate coercion and daily conversion

pub mod data;
pub mod domain;
pub mod error;
pub mod quality;
pub mod rates;

pub use error::{ConfigurationError, DataIntegrityError, FetchError, PipelineError};
