//! Synthetic price and rate sources for offline development runs.
//!
//! Series are deterministic per ticker (seeded from a BLAKE3 hash of the
//! symbol) and clearly fake. With defects enabled, a fixed share of tickers
//! carry the data problems the quality pipeline exists to catch: scattered
//! short gaps, a late listing, a long suspension, or no data at all.

use super::align::PricePoint;
use super::provider::{DataSource, PriceFetcher, RateFetcher};
use crate::domain::RawRateObservation;
use crate::error::FetchError;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rng_for(domain: &str, key: &str) -> StdRng {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(&[0]);
    hasher.update(key.as_bytes());
    StdRng::from_seed(*hasher.finalize().as_bytes())
}

/// Weekdays in `[start, end)`.
fn weekdays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d < end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// What kind of data problem a synthetic ticker has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticDefect {
    None,
    /// A handful of isolated one- or two-day holes.
    ShortGaps,
    /// No prices for the first 30% of the range.
    LateListing,
    /// One ten-day hole in the middle of the range.
    Suspension,
    /// The symbol is unknown to the source.
    Unlisted,
}

/// Deterministic random-walk prices.
pub struct SyntheticPriceFetcher {
    defects: bool,
}

impl SyntheticPriceFetcher {
    pub fn new() -> Self {
        Self { defects: true }
    }

    /// Every ticker gets a complete weekday series.
    pub fn clean() -> Self {
        Self { defects: false }
    }

    /// The defect assigned to `symbol`.
    pub fn defect_for(&self, symbol: &str) -> SyntheticDefect {
        if !self.defects {
            return SyntheticDefect::None;
        }
        match rng_for("defect", symbol).gen_range(0..100) {
            0..=69 => SyntheticDefect::None,
            70..=79 => SyntheticDefect::ShortGaps,
            80..=87 => SyntheticDefect::LateListing,
            88..=94 => SyntheticDefect::Suspension,
            _ => SyntheticDefect::Unlisted,
        }
    }
}

impl Default for SyntheticPriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFetcher for SyntheticPriceFetcher {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let defect = self.defect_for(symbol);
        if defect == SyntheticDefect::Unlisted {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let dates = weekdays(start, end);
        let n = dates.len();
        let mut rng = rng_for("prices", symbol);
        let mut price = rng.gen_range(20.0..400.0_f64);

        let mut points = Vec::with_capacity(n);
        for &date in &dates {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            points.push(PricePoint {
                date,
                close: Some(price),
            });
        }

        match defect {
            SyntheticDefect::ShortGaps => {
                let holes = rng.gen_range(3..8);
                for _ in 0..holes {
                    if n < 4 {
                        break;
                    }
                    let at = rng.gen_range(1..n - 2);
                    let len = rng.gen_range(1..=2);
                    for p in points.iter_mut().skip(at).take(len) {
                        p.close = None;
                    }
                }
            }
            SyntheticDefect::LateListing => {
                let cut = n * 3 / 10;
                for p in points.iter_mut().take(cut) {
                    p.close = None;
                }
            }
            SyntheticDefect::Suspension => {
                let at = n / 2;
                for p in points.iter_mut().skip(at).take(10) {
                    p.close = None;
                }
            }
            SyntheticDefect::None | SyntheticDefect::Unlisted => {}
        }

        // A real source omits days it has nothing for
        points.retain(|p| p.close.is_some());
        if points.is_empty() {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(points)
    }
}

/// Deterministic Treasury-like rate series. Fixed US market holidays come
/// back as `"."`, the way FRED reports them.
pub struct SyntheticRateFetcher;

impl RateFetcher for SyntheticRateFetcher {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_rate(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRateObservation>, FetchError> {
        let mut rng = rng_for("rate", series_id);
        let mut level = rng.gen_range(0.5..5.5_f64);

        Ok(weekdays(start, end)
            .into_iter()
            .map(|date| {
                level = (level + rng.gen_range(-0.02..0.02)).max(0.01);
                let holiday = matches!((date.month(), date.day()), (1, 1) | (7, 4) | (12, 25));
                RawRateObservation {
                    date,
                    value: Some(if holiday {
                        ".".to_string()
                    } else {
                        format!("{level:.2}")
                    }),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::NoProgress;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let f = SyntheticPriceFetcher::clean();
        let a = f.fetch_symbol("SPY", d("2024-01-01"), d("2024-03-01")).unwrap();
        let b = f.fetch_symbol("SPY", d("2024-01-01"), d("2024-03-01")).unwrap();
        assert_eq!(a, b);
        let c = f.fetch_symbol("QQQ", d("2024-01-01"), d("2024-03-01")).unwrap();
        assert_ne!(a[0].close, c[0].close);
    }

    #[test]
    fn weekdays_only_end_exclusive_positive() {
        let f = SyntheticPriceFetcher::clean();
        // 2024-01-08 is a Monday
        let points = f.fetch_symbol("SPY", d("2024-01-01"), d("2024-01-08")).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.close.is_some_and(|c| c > 0.0)));
        assert!(points.iter().all(|p| p.date < d("2024-01-08")));
    }

    #[test]
    fn defects_cover_every_kind_across_a_universe() {
        let f = SyntheticPriceFetcher::new();
        let kinds: Vec<SyntheticDefect> = (0..300).map(|i| f.defect_for(&format!("T{i}"))).collect();
        for kind in [
            SyntheticDefect::None,
            SyntheticDefect::ShortGaps,
            SyntheticDefect::LateListing,
            SyntheticDefect::Suspension,
            SyntheticDefect::Unlisted,
        ] {
            assert!(kinds.contains(&kind), "{kind:?} never assigned");
        }
    }

    #[test]
    fn panel_has_absent_cells_with_defects() {
        let f = SyntheticPriceFetcher::new();
        let tickers: Vec<String> = (0..40).map(|i| format!("T{i}")).collect();
        let table = f
            .fetch_prices(&tickers, d("2023-01-01"), d("2024-01-01"), &NoProgress)
            .unwrap();
        assert_eq!(table.n_cols(), 40);
        assert!(table.absent_count() > 0);
    }

    #[test]
    fn rate_series_marks_holidays() {
        let obs = SyntheticRateFetcher
            .fetch_rate("DGS3MO", d("2024-07-01"), d("2024-07-08"))
            .unwrap();
        let july4 = obs.iter().find(|o| o.date == d("2024-07-04")).unwrap();
        assert_eq!(july4.value.as_deref(), Some("."));
        assert_eq!(obs.len(), 5);
    }
}
