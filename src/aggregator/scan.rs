//! Single-pass scan of a trace stream.
//!
//! Reads the input line by line, classifies each line, feeds the correlator
//! and returns the finished [`Analysis`]. All state lives in the scan; two
//! scans of the same input produce equal results.

use super::correlator::{Correlator, TraceWarning, WarningKind};
use super::stats::Aggregator;
use crate::parser::{classify_line, LineClass};
use crate::utils::error::AnalyzeError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Result of scanning one trace
#[derive(Debug, Clone)]
pub struct Analysis {
    pub aggregator: Aggregator,
    pub warnings: Vec<TraceWarning>,
    /// Lines read from the input
    pub lines_read: usize,
    /// Lines starting with `[`
    pub trace_records: usize,
    /// Records carrying a known tracepoint tag
    pub events: usize,
    pub first_timestamp_ns: Option<u64>,
    pub last_timestamp_ns: Option<u64>,
}

impl Analysis {
    /// Wall-clock span between the first and last trace record
    pub fn trace_span_ns(&self) -> u64 {
        match (self.first_timestamp_ns, self.last_timestamp_ns) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }

    /// Number of lines that had a `[` prefix but no known tracepoint
    pub fn unknown_records(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| {
                matches!(
                    w.kind,
                    WarningKind::UnknownTracepoint | WarningKind::MalformedRecord(_)
                )
            })
            .count()
    }
}

/// Scan a trace from any buffered reader
///
/// **Public** - main entry point for analysis
///
/// # Errors
/// * `AnalyzeError::ReadFailed` - I/O error while reading the input
pub fn analyze_reader<R: BufRead>(mut reader: R) -> Result<Analysis, AnalyzeError> {
    let mut aggregator = Aggregator::new();
    let mut correlator = Correlator::new();
    let mut buf = Vec::new();
    let mut line_number = 0;
    let mut trace_records = 0;
    let mut events = 0;

    loop {
        buf.clear();
        line_number += 1;

        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| AnalyzeError::ReadFailed { line: line_number, source })?;
        if read == 0 {
            line_number -= 1;
            break;
        }

        // Trace text is ASCII; tolerate stray bytes rather than abort the scan
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(&['\n', '\r'][..]);

        let class = classify_line(line);
        match class {
            LineClass::Skipped => continue,
            LineClass::Event(_) => events += 1,
            _ => {}
        }
        trace_records += 1;

        correlator.process_line(line_number, &class, &mut aggregator);
    }

    correlator.finish(&mut aggregator);

    debug!(
        "Scanned {} lines: {} trace records, {} events",
        line_number, trace_records, events
    );

    Ok(Analysis {
        aggregator,
        first_timestamp_ns: correlator.first_timestamp_ns(),
        last_timestamp_ns: correlator.last_timestamp_ns(),
        warnings: correlator.into_warnings(),
        lines_read: line_number,
        trace_records,
        events,
    })
}

/// Scan a trace held in memory
pub fn analyze_str(trace: &str) -> Result<Analysis, AnalyzeError> {
    analyze_reader(trace.as_bytes())
}

/// Open and scan a trace file
pub fn analyze_file(path: impl AsRef<Path>) -> Result<Analysis, AnalyzeError> {
    let path = path.as_ref();
    info!("Reading trace: {}", path.display());

    let file = File::open(path).map_err(|source| AnalyzeError::OpenFailed {
        path: path.display().to_string(),
        source,
    })?;

    analyze_reader(BufReader::new(file))
}
