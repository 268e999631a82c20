//! panelprep runner: configuration, acquisition, reporting, export.
//!
//! This crate builds on `panelprep-core` to provide:
//! - The TOML pipeline configuration with defaults and validation
//! - Acquisition: parallel price/rate fetch followed by the quality pipeline
//! - The data quality report and returns summary
//! - Atomic CSV/JSON/text artifact export with a hash manifest

pub mod acquisition;
pub mod config;
pub mod export;
pub mod report;

pub use acquisition::{acquire, AcquisitionResult};
pub use config::PipelineConfig;
pub use export::{ArtifactPaths, ArtifactWriter, RunManifest, ARTIFACT_FILES};
pub use report::{QualityReport, ReturnsSummary, RiskFreeSummary};

use anyhow::Result;
use chrono::NaiveDateTime;

/// Build the report and manifest for a finished acquisition and write every
/// artifact into the configured output directory.
pub fn save_artifacts(
    result: &AcquisitionResult,
    config: &PipelineConfig,
    generated_at: NaiveDateTime,
) -> Result<(QualityReport, ArtifactPaths)> {
    let writer = ArtifactWriter::new(&config.run.output_dir)?;
    let files = ARTIFACT_FILES
        .iter()
        .map(|f| writer.output_dir().join(f).display().to_string())
        .collect();
    let report = QualityReport::build(result, config, generated_at, files);
    let manifest = RunManifest::build(result, config, generated_at);
    let paths = writer.write_all(result, &report, &manifest)?;
    Ok((report, paths))
}
