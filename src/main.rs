//! V2X Trace Analyzer CLI
//!
//! Reports time spent per layer and per function in a v2xsehsm/ecdsa
//! trace log.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use v2x_trace_analyzer::commands::{execute_analyze, validate_args, AnalyzeArgs};

/// V2X Trace Analyzer - latency breakdown for v2xsehsm and ecdsa traces
#[derive(Parser, Debug)]
#[command(name = "v2x-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Babeltrace text output to analyze
    trace_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // A malformed invocation prints usage and exits non-zero
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = AnalyzeArgs {
        trace_file: cli.trace_file,
    };

    validate_args(&args)?;

    let stdout = std::io::stdout();
    execute_analyze(&args, &mut stdout.lock())?;

    Ok(())
}
