//! helioprofile - solar-wind radial profile reduction
//!
//! # Usage
//!
//! ```bash
//! # Reduce every configured encounter with the default 1 Rs bins
//! helioprofile run
//!
//! # Finer bins, explicit config and data locations
//! helioprofile run --config helioprofile.toml --bin-width 0.5 --data-root DATA --stat-dir STATISTICS
//!
//! # Compare observed radial velocity against two simulation cuts
//! helioprofile compare --stats STATISTICS/statistics.json \
//!     --profile equatorial.csv --profile polar.csv --quantity vr
//!
//! # Print the effective configuration as TOML
//! helioprofile show-config
//! ```
//!
//! # Environment Variables
//!
//! - `HELIOPROFILE_CONFIG`: Path to the pipeline config file
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use helioprofile::simulation::{compare, Comparison, SimulationProfile};
use helioprofile::storage::{export, read_statistics};
use helioprofile::{CsvDirectorySource, Pipeline, PipelineConfig, Quantity};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "helioprofile")]
#[command(about = "Solar-wind plasma reduction and radial binning")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Reduce all configured encounters and write binned statistics
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Bin width in solar radii
        #[arg(long, value_name = "RS")]
        bin_width: Option<f64>,

        /// Root directory holding one folder per encounter
        #[arg(long, value_name = "DIR")]
        data_root: Option<PathBuf>,

        /// Output directory for statistics and sample tables
        #[arg(long, value_name = "DIR")]
        stat_dir: Option<PathBuf>,

        /// Encounters to process (repeatable; replaces the configured list)
        #[arg(long = "encounter", value_name = "NAME")]
        encounters: Vec<String>,
    },

    /// Compare a statistics table against simulation profiles
    Compare {
        /// statistics.json written by `run`
        #[arg(long, value_name = "FILE")]
        stats: PathBuf,

        /// Simulation mesh line-cut CSV (repeatable)
        #[arg(long = "profile", value_name = "FILE", required = true)]
        profiles: Vec<PathBuf>,

        /// vr, np, temp, mass_loss or ram_pressure
        #[arg(long)]
        quantity: Quantity,

        /// Write the comparison JSON here instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Config file (overrides $HELIOPROFILE_CONFIG and ./helioprofile.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => PipelineConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => PipelineConfig::load().context("Failed to load pipeline config"),
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn run(
    mut config: PipelineConfig,
    bin_width: Option<f64>,
    data_root: Option<PathBuf>,
    stat_dir: Option<PathBuf>,
    encounters: Vec<String>,
) -> Result<()> {
    if let Some(w) = bin_width {
        config.binning.bin_width = w;
    }
    if let Some(root) = data_root {
        config.paths.data_root = root;
    }
    if let Some(dir) = stat_dir {
        config.paths.statistics_dir = dir;
    }
    if !encounters.is_empty() {
        config.encounters.names = encounters;
    }

    info!(
        data_root = %config.paths.data_root.display(),
        stat_dir = %config.paths.statistics_dir.display(),
        bin_width = config.binning.bin_width,
        "Reduction configuration"
    );

    let source = CsvDirectorySource::from_config(&config);
    let pipeline = Pipeline::new(config, source).context("Invalid pipeline configuration")?;
    let summary = pipeline.run().context("Reduction run failed")?;

    for enc in &summary.encounters {
        info!(
            encounter = %enc.name,
            primary_raw = enc.primary.raw,
            primary = enc.primary.averaged,
            secondary_raw = enc.secondary.raw,
            secondary = enc.secondary.averaged,
            "Encounter summary"
        );
    }
    info!(
        bins = summary.bins,
        samples = summary.binned_samples,
        statistics = %summary.statistics_file.display(),
        "Done"
    );
    Ok(())
}

fn run_compare(
    stats: PathBuf,
    profiles: Vec<PathBuf>,
    quantity: Quantity,
    output: Option<PathBuf>,
) -> Result<()> {
    let table = read_statistics(&stats)
        .with_context(|| format!("Failed to read statistics table {}", stats.display()))?;

    let mut comparisons: Vec<Comparison> = Vec::with_capacity(profiles.len());
    for path in &profiles {
        let profile = SimulationProfile::from_csv(path)
            .with_context(|| format!("Failed to read simulation profile {}", path.display()))?;
        let comparison = compare(&table, &profile, quantity);
        info!(
            profile = %profile.name,
            quantity = quantity.column(),
            rows = comparison.rows.len(),
            "Compared profile"
        );
        comparisons.push(comparison);
    }

    match output {
        Some(path) => {
            export::write_json(&path, &comparisons)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote comparison");
        }
        None => println!("{}", serde_json::to_string_pretty(&comparisons)?),
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    match args.command {
        SubCommand::Run {
            config,
            bin_width,
            data_root,
            stat_dir,
            encounters,
        } => run(config.load()?, bin_width, data_root, stat_dir, encounters),
        SubCommand::Compare {
            stats,
            profiles,
            quantity,
            output,
        } => run_compare(stats, profiles, quantity, output),
        SubCommand::ShowConfig { config } => {
            print!("{}", config.load()?.to_toml_string()?);
            Ok(())
        }
    }
}
