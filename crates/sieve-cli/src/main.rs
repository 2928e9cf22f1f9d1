//! sieve CLI - quarantine corrupted and mismatched files

mod logging;
mod output;
mod progress;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use sieve_core::{ScanConfig, ValidatorRegistry, scan_directory_with};

use crate::progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about = "Find corrupted and mismatched files and move them into quarantine", long_about = None)]
struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Config file path (defaults to <PATH>/.sieve.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where flagged files are moved (defaults to ~/Desktop/Mismatched Files)
    #[arg(long)]
    quarantine_dir: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print one line per file and debug logs
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, config_warning) = match &cli.config {
        Some(path) => {
            let config = ScanConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (config, None)
        }
        None => ScanConfig::load_or_default(&cli.path),
    };

    if let Some(dir) = cli.quarantine_dir {
        config = config.with_quarantine_dir(dir);
    }
    if let Some(jobs) = cli.jobs {
        config = config.with_jobs(jobs);
    }

    if let Some(warning) = logging::init(cli.verbose, config.error_log()) {
        tracing::warn!("{}", warning);
    }
    if let Some(warning) = config_warning {
        tracing::warn!("{}", warning);
    }

    let registry = ValidatorRegistry::from_config(&config);

    let reporter = match cli.format {
        OutputFormat::Text => ProgressReporter::new(cli.verbose),
        OutputFormat::Json => ProgressReporter::hidden(),
    };

    let report = scan_directory_with(&cli.path, &config, &registry, &reporter)
        .with_context(|| format!("Scan of {} failed", cli.path.display()))?;

    match cli.format {
        OutputFormat::Text => output::print_text(&report),
        OutputFormat::Json => output::print_json(&report)?,
    }

    Ok(())
}
