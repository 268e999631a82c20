//! Universe configuration: tiered ticker lists.
//!
//! The universe is stored as a TOML file mapping tier names to member
//! tickers. Tiers are iterated in lexicographic name order, not file order:
//! `tier10` sorts before `tier2`, so zero-pad names (`tier01`) when more than
//! nine tiers need a numeric order. A ticker listed in more than one tier is
//! fetched once.

use crate::domain::Ticker;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub tiers: BTreeMap<String, Vec<Ticker>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        let universe: Self = toml::from_str(content)
            .map_err(|e| ConfigurationError::Parse(format!("universe: {e}")))?;
        universe.validate()?;
        Ok(universe)
    }

    /// Reject universes with no tickers or blank symbols.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.ticker_count() == 0 {
            return Err(ConfigurationError::Invalid(
                "universe contains no tickers".into(),
            ));
        }
        for (tier, tickers) in &self.tiers {
            if tickers.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigurationError::Invalid(format!(
                    "tier '{tier}' contains an empty ticker"
                )));
            }
        }
        Ok(())
    }

    /// All tickers, tiers in lexicographic name order, first occurrence kept.
    pub fn tickers(&self) -> Vec<Ticker> {
        let mut seen = HashSet::new();
        self.tiers
            .values()
            .flatten()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }

    /// Get tickers for a specific tier.
    pub fn tier_tickers(&self, tier: &str) -> Option<&[Ticker]> {
        self.tiers.get(tier).map(|v| v.as_slice())
    }

    /// Tier a ticker first appears in.
    pub fn tier_of(&self, ticker: &str) -> Option<&str> {
        self.tiers
            .iter()
            .find(|(_, members)| members.iter().any(|t| t == ticker))
            .map(|(name, _)| name.as_str())
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.keys().map(|s| s.as_str()).collect()
    }

    /// Number of distinct tickers.
    pub fn ticker_count(&self) -> usize {
        self.tickers().len()
    }

    /// Large-cap US equities in four tiers by market capitalisation.
    pub fn default_sp300() -> Self {
        let mut tiers = BTreeMap::new();
        tiers.insert("tier1".into(), owned(TIER1));
        tiers.insert("tier2".into(), owned(TIER2));
        tiers.insert("tier3".into(), owned(TIER3));
        tiers.insert("tier4".into(), owned(TIER4));
        Self { tiers }
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigurationError::Parse(format!("serialize universe: {e}")))
    }
}

fn owned(list: &[&str]) -> Vec<Ticker> {
    list.iter().map(|s| s.to_string()).collect()
}

const TIER1: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "BRK.B", "TSLA", "LLY", "V", "UNH", "XOM",
    "JPM", "MA", "AVGO", "JNJ", "WMT", "PG", "COST", "HD", "ABBV", "CVX", "MRK", "KO", "NFLX",
    "BAC", "ORCL", "PEP", "AMD", "ADBE", "CRM", "TMO", "CSCO", "MCD", "ABT", "INTC", "ACN", "DHR",
    "NKE", "TXN", "CMCSA", "WFC", "BMY", "HON", "NEE", "UNP", "VZ", "RTX", "QCOM", "LIN", "T",
];

const TIER2: &[&str] = &[
    "AMGN", "PM", "LOW", "UPS", "COP", "INTU", "PFE", "SPGI", "MDT", "DE", "C", "IBM", "BLK", "GE",
    "AMAT", "ADI", "AXP", "SBUX", "PLD", "ISRG", "CAT", "GILD", "MMC", "TJX", "BKNG", "SO", "CB",
    "CVS", "SYK", "SCHW", "ADP", "AMT", "CI", "ZTS", "MS", "GS", "NOW", "VRTX", "BA", "MO", "REGN",
    "DUK", "BDX", "CL", "EQIX", "PNC", "ITW", "APD", "ICE", "EOG", "USB", "SLB", "HUM", "CME",
    "MU", "NSC", "AON", "TGT", "LRCX", "ETN", "MCO", "WM", "PSA", "CCI", "MMM", "BSX", "KLAC",
    "SHW", "FCX", "APH", "ORLY", "D", "ADM", "ROP", "EW", "ECL", "AJG", "MSI", "DG", "MSCI",
    "PCAR", "F", "TRV", "NXPI", "GM", "KMB", "SRE", "AEP", "EL", "APO", "WELL", "PAYX", "MNST",
    "FIS", "SPG", "AIG", "AFL", "A", "CDNS", "TEL",
];

const TIER3: &[&str] = &[
    "KDP", "CTAS", "KMI", "GIS", "CMG", "HLT", "STZ", "NEM", "WMB", "BK", "CARR", "O", "PSX",
    "YUM", "MCHP", "EXC", "MAR", "CPRT", "ADSK", "AZO", "TDG", "DD", "HSY", "ROST", "ALL", "ODFL",
    "CTVA", "IDXX", "DVN", "LHX", "PRU", "AMP", "PEG", "AME", "CTSH", "OTIS", "DLR", "IQV", "EA",
    "RSG", "RMD", "ED", "FAST", "MLM", "HCA", "GWW", "KHC", "BKR", "CNC", "SNPS", "KVUE", "BIIB",
    "DXCM", "FTNT", "JCI", "IR", "IT", "NDAQ", "GLW", "ANSS", "VMC", "DAL", "KEYS", "XYL", "FANG",
    "FDX", "VRSK", "HES", "ON", "DOW", "EXR", "ROK", "EFX", "MTB", "AVB", "MPWR", "CDW", "TT",
    "WEC", "CBRE", "HPQ", "RJF", "PPG", "TROW", "CSGP", "STT", "FITB", "TSN", "AWK", "HBAN",
    "VICI", "WBD", "CHD", "LVS", "NUE", "DFS", "PH", "ZBH", "ES", "URI",
];

const TIER4: &[&str] = &[
    "ACGL", "MTD", "CPAY", "WY", "PWR", "TYL", "CF", "IFF", "HPE", "CAH", "TTWO", "EQR", "DTE",
    "AEE", "FTV", "HUBB", "PKG", "IRM", "TSCO", "ETR", "CNP", "GPN", "BAX", "WAB", "VLTO", "BBY",
    "WTW", "NTRS", "LH", "LYB", "PTC", "STLD", "BR", "HOLX", "STE", "MOH", "SBAC", "TDY", "BALL",
    "TRGP", "PPL", "INVH", "LDOS", "CLX", "K", "EXPE", "J", "RF", "COF", "EXPD",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_four_tiers() {
        let u = Universe::default_sp300();
        assert_eq!(u.tier_names(), vec!["tier1", "tier2", "tier3", "tier4"]);
        assert_eq!(u.tier_tickers("tier1").map(|t| t.len()), Some(51));
        assert_eq!(u.tier_tickers("tier4").map(|t| t.len()), Some(50));
        assert_eq!(u.ticker_count(), 301);
    }

    #[test]
    fn tickers_follow_tier_order() {
        let u = Universe::default_sp300();
        let all = u.tickers();
        assert_eq!(all.first().map(String::as_str), Some("AAPL"));
        assert_eq!(all.last().map(String::as_str), Some("EXPD"));
        assert_eq!(u.tier_of("AMGN"), Some("tier2"));
    }

    #[test]
    fn duplicate_across_tiers_fetched_once() {
        let u = Universe::from_toml(
            r#"
            [tiers]
            core = ["AAPL", "MSFT"]
            extra = ["MSFT", "NVDA"]
            "#,
        )
        .unwrap();
        assert_eq!(u.tickers(), vec!["AAPL", "MSFT", "NVDA"]);
        assert_eq!(u.tier_of("MSFT"), Some("core"));
    }

    #[test]
    fn tiers_iterate_in_lexicographic_order() {
        let u = Universe::from_toml(
            r#"
            [tiers]
            tier2 = ["MSFT"]
            tier10 = ["NVDA"]
            tier1 = ["AAPL"]
            "#,
        )
        .unwrap();
        assert_eq!(u.tier_names(), vec!["tier1", "tier10", "tier2"]);
        assert_eq!(u.tickers(), vec!["AAPL", "NVDA", "MSFT"]);
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::default_sp300();
        let toml_str = u.to_toml().unwrap();
        let parsed = Universe::from_toml(&toml_str).unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn empty_universe_rejected() {
        let err = Universe::from_toml("[tiers]\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }

    #[test]
    fn blank_ticker_rejected() {
        assert!(Universe::from_toml("[tiers]\na = [\"AAPL\", \" \"]\n").is_err());
    }
}
