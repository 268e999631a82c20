//! Data acquisition: universe, fetchers, alignment.

pub mod align;
pub mod fred;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use align::{align_series, PricePoint};
pub use fred::FredRateFetcher;
pub use provider::{DataSource, DownloadProgress, NoProgress, PriceFetcher, RateFetcher, StdoutProgress};
pub use synthetic::{SyntheticDefect, SyntheticPriceFetcher, SyntheticRateFetcher};
pub use universe::Universe;
pub use yahoo::YahooPriceFetcher;
