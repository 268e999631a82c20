//! Pipeline configuration file.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Command-line flags override individual fields after loading.
//!
//! ```toml
//! [run]
//! start_date = "2020-01-01"
//! end_date = "2026-01-19"    # exclusive
//! output_dir = "data"
//!
//! [quality]
//! max_missing_pct = 5.0
//! min_days_required = 1200
//! max_consecutive_gap = 5
//! extreme_threshold = 0.5
//!
//! [risk_free]
//! series_id = "DGS3MO"
//! api_key_env = "FRED_API_KEY"
//! request_timeout_secs = 30
//!
//! [prices]
//! request_timeout_secs = 30
//! ```

use chrono::NaiveDate;
use panelprep_core::error::ConfigurationError;
use panelprep_core::quality::QualityConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub run: RunSection,
    pub quality: QualityConfig,
    pub risk_free: RiskFreeSection,
    pub prices: PriceSection,
}

/// Date range and output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// First date requested (inclusive).
    pub start_date: NaiveDate,
    /// Last date requested (exclusive).
    pub end_date: NaiveDate,
    pub output_dir: PathBuf,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 19).unwrap_or(NaiveDate::MIN),
            output_dir: PathBuf::from("data"),
        }
    }
}

/// Risk-free rate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFreeSection {
    pub series_id: String,
    /// Environment variable holding the FRED API key.
    pub api_key_env: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for RiskFreeSection {
    fn default() -> Self {
        Self {
            series_id: "DGS3MO".into(),
            api_key_env: "FRED_API_KEY".into(),
            base_url: panelprep_core::data::fred::DEFAULT_BASE_URL.into(),
            request_timeout_secs: 30,
        }
    }
}

/// Equity price source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSection {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for PriceSection {
    fn default() -> Self {
        Self {
            base_url: panelprep_core::data::yahoo::DEFAULT_BASE_URL.into(),
            request_timeout_secs: 30,
        }
    }
}

impl PriceSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RiskFreeSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// Check ranges and thresholds.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.run.start_date >= self.run.end_date {
            return Err(ConfigurationError::Invalid(format!(
                "start_date {} must be before end_date {}",
                self.run.start_date, self.run.end_date
            )));
        }
        let q = &self.quality;
        if !(0.0..=100.0).contains(&q.max_missing_pct) {
            return Err(ConfigurationError::Invalid(format!(
                "max_missing_pct must be within [0, 100], got {}",
                q.max_missing_pct
            )));
        }
        if !(q.extreme_threshold.is_finite() && q.extreme_threshold > 0.0) {
            return Err(ConfigurationError::Invalid(format!(
                "extreme_threshold must be positive, got {}",
                q.extreme_threshold
            )));
        }
        if self.risk_free.series_id.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "risk_free.series_id is empty".into(),
            ));
        }
        if self.prices.request_timeout_secs == 0 || self.risk_free.request_timeout_secs == 0 {
            return Err(ConfigurationError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Read the FRED API key from the configured environment variable.
    ///
    /// Unset and blank values are both missing.
    pub fn fred_api_key(&self) -> Result<String, ConfigurationError> {
        let var = &self.risk_free.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigurationError::MissingCredential(var.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.run.start_date.to_string(), "2020-01-01");
        assert_eq!(config.run.end_date.to_string(), "2026-01-19");
        assert_eq!(config.quality.min_days_required, 1200);
        assert_eq!(config.risk_free.series_id, "DGS3MO");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [quality]
            max_missing_pct = 10.0

            [run]
            output_dir = "out"
            "#,
        )
        .unwrap();
        assert_eq!(config.quality.max_missing_pct, 10.0);
        assert_eq!(config.quality.max_consecutive_gap, 5);
        assert_eq!(config.run.output_dir, PathBuf::from("out"));
        assert_eq!(config.run.start_date.to_string(), "2020-01-01");
    }

    #[test]
    fn toml_roundtrip() {
        let config = PipelineConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn inverted_range_rejected() {
        let err = PipelineConfig::from_toml(
            r#"
            [run]
            start_date = "2024-01-01"
            end_date = "2024-01-01"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        assert!(PipelineConfig::from_toml("[quality]\nmax_missing_pct = 120.0\n").is_err());
        assert!(PipelineConfig::from_toml("[quality]\nextreme_threshold = 0.0\n").is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PipelineConfig::from_toml("[run\nstart_date = 1").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/panelprep.toml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Read { .. }));
    }

    #[test]
    fn unset_api_key_is_missing_credential() {
        let mut config = PipelineConfig::default();
        config.risk_free.api_key_env = "PANELPREP_TEST_UNSET_KEY_7F3A".into();
        let err = config.fred_api_key().unwrap_err();
        assert!(
            matches!(err, ConfigurationError::MissingCredential(ref v) if v == "PANELPREP_TEST_UNSET_KEY_7F3A")
        );
    }

    #[test]
    fn api_key_read_from_named_variable() {
        let var = "PANELPREP_TEST_SET_KEY_91C2";
        std::env::set_var(var, "  abc123  ");
        let mut config = PipelineConfig::default();
        config.risk_free.api_key_env = var.into();
        assert_eq!(config.fred_api_key().unwrap(), "abc123");
        std::env::remove_var(var);
    }
}
