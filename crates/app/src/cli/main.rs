//! vstlog CLI Application

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vstlog_core::domain::config::{AnalyzerConfig, ConfigManager};
use vstlog_core::domain::plot::{PlotData, PlotError, Visualizer};
use vstlog_core::domain::{load_log_file, AnalysisReport, LogRecord};
use vstlog_infra::PlottersVisualizer;

#[derive(Parser)]
#[command(name = "vstlog")]
#[command(about = "Analyze AMNEZIAGAZE VST log files", long_about = None)]
struct Cli {
    /// Path to the VST log file
    log_file: Option<PathBuf>,

    /// Generate visualization plots
    #[arg(long)]
    plots: bool,

    /// Directory for output plots
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    match explicit {
        Some(path) => AnalyzerConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => match ConfigManager::default_config_dir() {
            Ok(dir) => {
                let manager = ConfigManager::new(dir);
                tracing::debug!(
                    path = %manager.config_path().display(),
                    exists = manager.exists(),
                    "Resolving user config"
                );
                Ok(manager.load())
            }
            Err(e) => {
                tracing::debug!(error = %e, "No config directory, using defaults");
                Ok(AnalyzerConfig::default())
            }
        },
    }
}

fn print_missing_log(out: &mut impl Write, path: &Path, default_path: &Path) -> std::io::Result<()> {
    writeln!(out, "Error: Log file not found: {}", path.display())?;
    writeln!(out)?;
    writeln!(out, "To generate a log file:")?;
    writeln!(out, "1. Load the AMNEZIAGAZE plugin in your DAW")?;
    writeln!(out, "2. Play some audio through it")?;
    writeln!(out, "3. The log will be created at: {}", default_path.display())
}

/// Render the charts and describe the outcome. Plot failures never abort the run.
fn create_plots(records: &[LogRecord], config: &AnalyzerConfig, output_dir: &Path) -> String {
    let data = PlotData::from_records(records, &config.plots);
    let visualizer = PlottersVisualizer::new(config.plots.clone());

    match visualizer.render(&data, output_dir) {
        Ok(written) => {
            tracing::debug!(count = written.len(), "Plot rendering finished");
            format!("Visualization plots saved to: {}/", output_dir.display())
        }
        Err(PlotError::BackendUnavailable(reason)) => {
            tracing::warn!(%reason, "Plotting backend unavailable");
            format!("Note: plotting not available ({})", reason)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Plot rendering failed");
            format!("Error creating plots: {}", e)
        }
    }
}

/// Analyze one log. The report goes to `out`; with `--format json` the plot
/// outcome goes to `err` so `out` stays valid JSON. A missing or malformed
/// log is reported on `out` and is not an error.
fn run(
    cli: &Cli,
    config: &AnalyzerConfig,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<()> {
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.input.default_log_path.clone());
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.plots.output_dir.clone());

    let text_output = cli.format == Format::Text;

    if text_output {
        writeln!(out, "AMNEZIAGAZE VST Log Analyzer")?;
        writeln!(out, "{}", "=".repeat(40))?;
    }

    if !log_file.exists() {
        print_missing_log(out, &log_file, &config.input.default_log_path)?;
        return Ok(());
    }

    let records = match load_log_file(&log_file) {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(error = ?e, "Log rejected");
            writeln!(out, "Error loading log file: {}", e)?;
            return Ok(());
        }
    };

    let report = AnalysisReport::build(&records, &config.analysis);

    if text_output {
        writeln!(
            out,
            "Loaded {} log entries from {}",
            report.summary.entries,
            log_file.display()
        )?;
        if let Some(range) = report.summary.time_range() {
            writeln!(out, "Time range: {}", range)?;
        }
        write!(out, "{}", report)?;
    } else {
        writeln!(out, "{}", report.to_json()?)?;
    }

    if cli.plots {
        let outcome = create_plots(&records, config, &output_dir);
        if text_output {
            writeln!(out)?;
            writeln!(out, "{}", outcome)?;
        } else {
            writeln!(err, "{}", outcome)?;
        }
    }

    if text_output {
        writeln!(out)?;
        writeln!(out, "Analysis complete! Log file: {}", log_file.display())?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr, stdout carries the report
    let default_filter = if cli.verbose { "vstlog=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run(&cli, &config, &mut stdout.lock(), &mut stderr.lock())
}
