//! panelprep CLI: fetch, clean and persist an equity return panel.
//!
//! Commands:
//! - `run`: download prices and the risk-free rate, run quality checks, write artifacts
//! - `init-config`: print the default pipeline configuration as TOML
//! - `init-universe`: print the default ticker universe as TOML

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use panelprep_core::data::{
    FredRateFetcher, PriceFetcher, RateFetcher, StdoutProgress, SyntheticPriceFetcher,
    SyntheticRateFetcher, Universe, YahooPriceFetcher,
};
use panelprep_runner::{acquire, save_artifacts, AcquisitionResult, PipelineConfig, QualityReport};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "panelprep_core=info,panelprep_runner=info,panelprep=info";

#[derive(Parser)]
#[command(
    name = "panelprep",
    about = "panelprep: equity price panel and risk-free rate acquisition with quality checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, clean, and save prices, returns and the risk-free rate.
    Run {
        /// Path to a TOML pipeline config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a TOML universe file. Defaults to the built-in four-tier list.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// First date (YYYY-MM-DD, inclusive). Overrides the config.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD, exclusive). Overrides the config.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory. Overrides the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Use deterministic synthetic data instead of Yahoo Finance and FRED.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Print the default pipeline configuration.
    InitConfig,
    /// Print the default ticker universe.
    InitUniverse,
}

fn main() {
    // A missing .env file is fine; the environment may already carry the key.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            config,
            universe,
            start,
            end,
            output_dir,
            synthetic,
        } => run_pipeline(config, universe, start, end, output_dir, synthetic),
        Commands::InitConfig => PipelineConfig::default()
            .to_toml()
            .map(|text| print!("{text}"))
            .map_err(anyhow::Error::from),
        Commands::InitUniverse => Universe::default_sp300()
            .to_toml()
            .map(|text| print!("{text}"))
            .map_err(anyhow::Error::from),
    };

    if let Err(e) = outcome {
        eprintln!("✗ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_pipeline(
    config_path: Option<PathBuf>,
    universe_path: Option<PathBuf>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output_dir: Option<PathBuf>,
    synthetic: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(start) = start {
        config.run.start_date = start;
    }
    if let Some(end) = end {
        config.run.end_date = end;
    }
    if let Some(dir) = output_dir {
        config.run.output_dir = dir;
    }
    config.validate()?;

    let rule = "=".repeat(60);
    println!("{rule}");
    println!("PORTFOLIO DATA ACQUISITION");
    println!("{rule}");
    println!(
        "Start time: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    println!("Step 1: Defining stock universe...");
    let universe = match &universe_path {
        Some(path) => Universe::from_file(path)?,
        None => Universe::default_sp300(),
    };
    let tickers = universe.tickers();
    println!("  Tiers: {}", universe.tier_names().join(", "));
    println!("  Total tickers: {}", tickers.len());

    let (prices, rates) = build_fetchers(&config, synthetic)?;
    info!(
        price_source = prices.name(),
        rate_source = rates.name(),
        "fetchers ready"
    );

    println!(
        "\nStep 2: Downloading prices ({}) and risk-free rate {} ({}) in parallel...",
        prices.name(),
        config.risk_free.series_id,
        rates.name()
    );
    println!(
        "  Date range: {} to {} (end exclusive)\n",
        config.run.start_date, config.run.end_date
    );
    let result = acquire(&tickers, &config, prices.as_ref(), rates.as_ref(), &StdoutProgress)?;
    print_download_summary(&result);

    println!("\nStep 3: Data quality checks...");
    print_quality_summary(&result, &config);

    println!("\nStep 4: Saving data...");
    let generated_at = chrono::Local::now().naive_local();
    let (report, paths) = save_artifacts(&result, &config, generated_at)
        .with_context(|| format!("saving artifacts to {}", config.run.output_dir.display()))?;
    for file in &report.files {
        println!("  ✓ Saved: {file}");
    }

    print_final_summary(&report);
    info!(manifest = %paths.manifest.display(), "run complete");
    Ok(())
}

type Fetchers = (Box<dyn PriceFetcher>, Box<dyn RateFetcher>);

/// Real sources need the FRED key up front; synthetic runs need nothing.
fn build_fetchers(config: &PipelineConfig, synthetic: bool) -> Result<Fetchers> {
    if synthetic {
        println!("WARNING: using synthetic data; outputs are tagged synthetic");
        return Ok((
            Box::new(SyntheticPriceFetcher::new()),
            Box::new(SyntheticRateFetcher),
        ));
    }

    let api_key = config.fred_api_key()?;
    let prices =
        YahooPriceFetcher::with_base_url(&config.prices.base_url, config.prices.timeout())?;
    let rates = FredRateFetcher::with_base_url(
        &config.risk_free.base_url,
        api_key,
        config.risk_free.timeout(),
    )?;
    Ok((Box::new(prices), Box::new(rates)))
}

fn print_download_summary(result: &AcquisitionResult) {
    let raw = &result.raw;
    println!(
        "\n✓ Downloaded data for {} of {} stocks",
        result.downloaded(),
        result.requested.len()
    );
    if let (Some(first), Some(last)) = (raw.dates().first(), raw.dates().last()) {
        println!("  Date range: {first} to {last}");
    }
    println!("  Trading days: {}", raw.n_rows());

    let rf = &result.risk_free;
    println!("✓ Downloaded risk-free rate ({} observations)", rf.len());
    if let Some((first, last)) = rf.date_range() {
        println!("  Date range: {first} to {last}");
    }
    if let Some(pct) = rf.latest().and_then(|o| o.annual_pct) {
        println!("  Current {}: {pct:.2}%", rf.series_id);
    }
}

fn print_quality_summary(result: &AcquisitionResult, config: &PipelineConfig) {
    let outcome = &result.outcome;
    let q = &config.quality;
    let c = &outcome.counts;

    println!("  Missing data analysis:");
    println!("    Stocks with >5% missing: {}", outcome.profile.count_above(5.0));
    println!("    Stocks with >10% missing: {}", outcome.profile.count_above(10.0));
    println!("    Stocks removed: {}", c.input - c.after_missing_filter);
    println!("    Stocks retained: {}", c.after_missing_filter);
    println!("  Minimum history requirement (>={} days):", q.min_days_required);
    println!("    Stocks retained: {}", c.after_history_filter);
    println!(
        "  Gap repair (<={} consecutive days): {} cells filled",
        q.max_consecutive_gap, outcome.cells_repaired
    );
    println!("  Final stocks after all checks: {}", c.after_completeness_filter);
    println!("  Final trading days: {}", outcome.clean.n_rows());

    if outcome.outliers.total > 0 {
        println!(
            "  ⚠ Warning: {} extreme returns detected (|r| > {})",
            outcome.outliers.total, q.extreme_threshold
        );
    }
}

fn print_final_summary(report: &QualityReport) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("✓ DATA ACQUISITION COMPLETED SUCCESSFULLY");
    println!("{rule}");
    println!(
        "End time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Clean panel: {} stocks, {} return days",
        report.passing(),
        report.trading_days
    );
    if let Some(mean) = report.returns.mean_daily_return {
        println!("  Mean daily return: {:.4}%", mean * 100.0);
    }
    if let Some(vol) = report.returns.mean_daily_volatility {
        println!("  Mean daily volatility: {:.2}%", vol * 100.0);
    }
    println!("{rule}");
}
