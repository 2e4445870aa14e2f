//! ringres: substrate permittivity and loss tangent from ring resonator S21.
//!
//! This is the main entry point for the extraction tool.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ExtractConfig;
use ringres_core::extraction::{write_trace_csv, ReportSink};
use ringres_core::{ExtractionReport, Network, Pipeline, Trace};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ringres")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract permittivity and loss tangent from a resonator measurement
    Extract {
        /// Path to the extraction configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Touchstone file to use instead of the configured one
        #[arg(short, long)]
        touchstone: Option<PathBuf>,

        /// Peak threshold above the median level (dB)
        #[arg(long)]
        min_peak_db: Option<f64>,
    },

    /// Parse and summarise a Touchstone file
    Inspect {
        /// Path to the .sNp or .ts file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Extract {
            config,
            touchstone,
            min_peak_db,
        } => {
            run_extraction(&config, touchstone, min_peak_db, cli.format)?;
        }
        Commands::Inspect { file } => {
            inspect(&file)?;
        }
    }

    Ok(())
}

fn run_extraction(
    config_path: &Path,
    touchstone: Option<PathBuf>,
    min_peak_db: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let mut config = config::load_config(config_path)?;
    if let Some(path) = touchstone {
        config.touchstone = path;
    }
    if let Some(db) = min_peak_db {
        config.detection.min_peak_db = db;
        config::validate_config(&config)?;
    }

    let mut sink = output::ReportWriter::new(format, &config.output);
    extract(&config, &mut sink)?;
    Ok(())
}

/// Run the staged pipeline on the configured trace
fn extract(config: &ExtractConfig, sink: &mut dyn ReportSink) -> Result<ExtractionReport> {
    if !config.touchstone.exists() {
        anyhow::bail!("Touchstone file not found: {:?}", config.touchstone);
    }

    let trace = Network::load_trace(
        &config.touchstone,
        config.trace.output_port,
        config.trace.input_port,
    )
    .with_context(|| {
        format!(
            "Cannot read S{}{} from {:?}",
            config.trace.output_port, config.trace.input_port, config.touchstone
        )
    })?;

    tracing::debug!("Loaded {} points from {:?}", trace.len(), config.touchstone);

    let mut pipeline = Pipeline::new(config.params(), config.options());
    run_stages(&mut pipeline, trace, config, sink).with_context(|| "Extraction aborted")?;

    pipeline
        .report_data()
        .cloned()
        .with_context(|| format!("Pipeline ended in state {}", pipeline.state()))
}

fn run_stages(
    pipeline: &mut Pipeline,
    trace: Trace,
    config: &ExtractConfig,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    pipeline.load(trace)?;
    pipeline.detect_peaks()?;

    if let (Some(path), Some(trace), Some(peaks)) = (
        &config.output.trace_csv,
        pipeline.trace(),
        pipeline.peaks(),
    ) {
        let file = File::create(path)
            .with_context(|| format!("Failed to create trace CSV: {:?}", path))?;
        write_trace_csv(trace, peaks, BufWriter::new(file))?;
        tracing::info!("Trace CSV saved to {:?}", path);
    }

    pipeline.compute()?;
    pipeline.report(sink)?;
    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    tracing::info!("Parsing Touchstone file: {:?}", file);

    let ntwk = Network::from_touchstone(file)
        .with_context(|| format!("Failed to read Touchstone file: {:?}", file))?;

    let stdout = std::io::stdout();
    output::write_network_summary(&ntwk, &mut stdout.lock())?;
    Ok(())
}
