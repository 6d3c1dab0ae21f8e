//! Line classifier for LTTng/babeltrace text output.
//!
//! A trace record looks like:
//!
//! ```text
//! [10:23:45.123456789] (+0.000012345) host v2xsehsm:apiEntry: { cpu_id = 1 }, { apiFunctionID = 257 }
//! ```
//!
//! Only three things matter here: the bracketed wall-clock timestamp, the
//! `<provider>:<event>` tag and the optional `apiFunctionID` field.

use super::tracepoint::TracepointKind;
use crate::utils::config::{FUNCTION_ID_FIELD, NO_FUNCTION_ID, NS_PER_SEC, TRACE_RECORD_PREFIX};
use crate::utils::error::ParseError;
use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `apiFunctionID = <int>` and captures the integer
static FUNCTION_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{}\s*=\s*(\d+)", regex::escape(FUNCTION_ID_FIELD)))
        .expect("Valid regex pattern")
});

/// One classified tracepoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Nanoseconds since midnight of the trace clock
    pub timestamp_ns: u64,
    pub kind: TracepointKind,
    pub function_id: u32,
}

/// Result of classifying one raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Not a trace record (does not start with `[`)
    Skipped,
    /// Trace record whose timestamp could not be read
    Malformed(ParseError),
    /// Trace record with a valid timestamp but no known tracepoint tag
    Unknown { timestamp_ns: u64 },
    /// Recognized tracepoint
    Event(TraceEvent),
}

/// Classify a single raw trace line
///
/// **Public** - main entry point of the classifier, no side effects
pub fn classify_line(line: &str) -> LineClass {
    if !line.starts_with(TRACE_RECORD_PREFIX) {
        return LineClass::Skipped;
    }

    let timestamp_ns = match parse_timestamp_ns(line) {
        Ok(ts) => ts,
        Err(e) => return LineClass::Malformed(e),
    };

    match extract_tracepoint_kind(line) {
        Some(kind) => LineClass::Event(TraceEvent {
            timestamp_ns,
            kind,
            function_id: extract_function_id(line),
        }),
        None => LineClass::Unknown { timestamp_ns },
    }
}

/// Parse the `[HH:MM:SS.nnnnnnnnn]` prefix into nanoseconds since midnight
///
/// Midnight wraparound is not handled: a trace crossing 00:00 produces
/// timestamps that go backwards.
pub fn parse_timestamp_ns(line: &str) -> Result<u64, ParseError> {
    let rest = line
        .strip_prefix(TRACE_RECORD_PREFIX)
        .ok_or(ParseError::UnterminatedTimestamp)?;
    let end = rest.find(']').ok_or(ParseError::UnterminatedTimestamp)?;
    let stamp = rest[..end].trim();

    let time = NaiveTime::parse_from_str(stamp, "%H:%M:%S%.f")
        .map_err(|_| ParseError::InvalidTimestamp(stamp.to_string()))?;

    Ok(u64::from(time.num_seconds_from_midnight()) * NS_PER_SEC + u64::from(time.nanosecond()))
}

/// Find the first known `<provider>:<event>` tag after the timestamp
///
/// **Private** - tokens are split on whitespace and commas; babeltrace
/// appends a `:` to the event name, which is stripped before matching.
fn extract_tracepoint_kind(line: &str) -> Option<TracepointKind> {
    let body = line.find(']').map_or(line, |end| &line[end + 1..]);

    body.split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_end_matches(':'))
        .find_map(|token| token.parse::<TracepointKind>().ok())
}

/// Extract the `apiFunctionID` value, or 0 when the field is absent
pub fn extract_function_id(line: &str) -> u32 {
    FUNCTION_ID_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(NO_FUNCTION_ID)
}
