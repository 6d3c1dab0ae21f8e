//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Scans the trace file
//! 2. Prints the layer/function report

use super::models::AnalyzeArgs;
use crate::aggregator::{analyze_file, Analysis};
use crate::output::generate_report;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::Write;
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// The report goes to `out`; progress and correlation warnings go to the log.
///
/// # Errors
/// * Trace file cannot be opened or read
/// * Report cannot be written to `out`
pub fn execute_analyze(args: &AnalyzeArgs, out: &mut impl Write) -> Result<Analysis> {
    let start_time = Instant::now();

    let analysis = analyze_file(&args.trace_file)
        .with_context(|| format!("Failed to analyze {}", args.trace_file.display()))?;

    debug!(
        "{} lines, {} trace records, {} events, trace span {} ns",
        analysis.lines_read,
        analysis.trace_records,
        analysis.events,
        analysis.trace_span_ns()
    );

    if !analysis.warnings.is_empty() {
        warn!(
            "{} correlation warnings ({} unrecognized trace records)",
            analysis.warnings.len(),
            analysis.unknown_records()
        );
    }

    out.write_all(generate_report(&analysis).as_bytes())
        .context("Failed to write report")?;
    out.flush().context("Failed to write report")?;

    debug!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(analysis)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace_file.as_os_str().is_empty() {
        anyhow::bail!("Trace file path cannot be empty");
    }

    if !args.trace_file.is_file() {
        anyhow::bail!("Trace file not found: {}", args.trace_file.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_args_missing_file() {
        let args = AnalyzeArgs {
            trace_file: PathBuf::from("/definitely/not/here.txt"),
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_path() {
        assert!(validate_args(&AnalyzeArgs::default()).is_err());
    }

    #[test]
    fn test_validate_args_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            trace_file: dir.path().to_path_buf(),
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_valid() {
        let trace = NamedTempFile::new().unwrap();
        let args = AnalyzeArgs {
            trace_file: trace.path().to_path_buf(),
        };
        assert!(validate_args(&args).is_ok());
    }
}
