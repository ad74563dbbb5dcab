//! # Midpoint Pi
//!
//! Command-line entry point. Loads configuration, starts the worker group on
//! the chosen transport and prints the result owner's report.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use midpoint_pi::config::{LogFormat, PiConfig};
use midpoint_pi::logging::{init_logging, verbosity_level};
use midpoint_pi::reduce::GlobalResult;
use midpoint_pi::report::{render, OutputFormat};
use midpoint_pi::runner::run_threaded;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "midpoint-pi")]
#[command(about = "Estimate pi with a midpoint-rule integration split across workers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Total number of integration steps (default: 1000000)
    #[arg(allow_negative_numbers = true)]
    steps: Option<i64>,

    /// Number of workers for the thread transport (default: available CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log format (overrides configuration)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// How workers are connected
    #[arg(long, value_enum, default_value_t = Transport::Threads)]
    transport: Transport,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// One thread per worker in this process
    Threads,
    /// One process per worker, launched by mpirun
    #[cfg(feature = "mpi")]
    Mpi,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match cli.transport {
        Transport::Threads => {
            let config = load_config(cli)?;
            // Nothing starts unless the whole configuration is usable
            config.validate()?;
            let result = run_threaded(config.num_steps, config.workers)?;
            print_report(&result, cli.format)?;
        }
        #[cfg(feature = "mpi")]
        Transport::Mpi => {
            // Every rank joins before loading; a bad configuration aborts the whole world
            let outcome = midpoint_pi::runner::run_mpi(|| load_config(cli))?;
            if let Some(result) = outcome.into_result() {
                print_report(&result, cli.format)?;
            }
        }
    }

    Ok(())
}

/// Layered configuration with command-line overrides, then logging set up from it
fn load_config(cli: &Cli) -> midpoint_pi::Result<PiConfig> {
    let config = PiConfig::load(cli.config.as_deref())?.with_overrides(cli.steps, cli.workers);

    init_logging(
        &verbosity_level(&config.log_level, cli.verbose),
        cli.log_format.unwrap_or(config.log_format),
    );
    debug!(config = ?config, transport = ?cli.transport, "Configuration loaded");
    Ok(config)
}

fn print_report(result: &GlobalResult, format: OutputFormat) -> anyhow::Result<()> {
    let report = render(result, format).context("failed to render report")?;
    println!("{report}");
    Ok(())
}
