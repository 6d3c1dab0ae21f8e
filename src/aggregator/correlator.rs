//! Pairing of open/close tracepoints into timed calls.
//!
//! Every [`Channel`] is a two-state machine: idle, or pending with the start
//! timestamp and function ID of the open event. A close event on a pending
//! channel produces a [`CompletedCall`] for the [`Aggregator`].
//!
//! Pairing is lenient. Structural problems (a second open before the close,
//! a close with nothing pending, a close for a different function) are
//! reported as [`TraceWarning`]s and the scan carries on:
//! - a second open replaces the pending one
//! - a close with nothing pending is dropped
//! - a close for a different function is still timed against the pending
//!   open and credited to the pending function

use super::stats::{Aggregator, CompletedCall};
use crate::parser::{Channel, Edge, Layer, LineClass, TraceEvent, TracepointKind};
use crate::utils::config::NO_FUNCTION_ID;
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::fmt;

/// An open event waiting for its close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCall {
    pub start_ns: u64,
    pub function_id: u32,
    pub line: usize,
}

/// apiEntry-to-apiEntry window used for ECDSA latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LatencyWindow {
    function_id: u32,
    start_ns: u64,
    line: usize,
}

/// What went wrong on a trace line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// Open event while the channel already had a pending open
    DuplicateOpen { kind: TracepointKind },
    /// Close event with nothing pending on the channel
    UnmatchedClose { kind: TracepointKind },
    /// Close event whose function differs from the pending open
    FunctionMismatch {
        kind: TracepointKind,
        expected: u32,
        found: u32,
    },
    /// Trace record without any known tracepoint tag
    UnknownTracepoint,
    /// Trace record whose timestamp could not be parsed
    MalformedRecord(ParseError),
    /// Channel still pending when the input ended
    MissingCloseAtEof { kind: TracepointKind },
    /// ECDSA latency window with no apiExit or endBackgroundProcessing inside it
    IncompleteLatencyWindow { function_id: u32 },
}

/// A non-fatal problem found while correlating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceWarning {
    /// 1-based input line, `None` for end-of-input checks
    pub line: Option<usize>,
    pub kind: WarningKind,
}

impl fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line.unwrap_or_default();
        match &self.kind {
            WarningKind::DuplicateOpen { kind } | WarningKind::UnmatchedClose { kind } => {
                write!(f, "mismatch of {} field on line {}", kind, line)
            }
            WarningKind::FunctionMismatch { kind, expected, found } => write!(
                f,
                "mismatch of {} function on line {} (pending {}, got {})",
                kind, line, expected, found
            ),
            WarningKind::UnknownTracepoint => write!(f, "unknown trace entry on line {}", line),
            WarningKind::MalformedRecord(e) => {
                write!(f, "malformed trace entry on line {}: {}", line, e)
            }
            WarningKind::MissingCloseAtEof { kind } => {
                write!(f, "missing {} field at end of file", kind)
            }
            WarningKind::IncompleteLatencyWindow { function_id } => write!(
                f,
                "no ecdsa completion for latency window of function {} opened on line {}",
                function_id, line
            ),
        }
    }
}

/// Event correlator state for one run
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    pending: [Option<PendingCall>; 6],
    /// Function of the most recent SE apiEntry, encloses SE HSM and system calls
    se_api_fn: u32,
    /// Function of the most recent ECDSA apiEntry, encloses background and HSM work
    ecdsa_api_fn: u32,
    latency_window: Option<LatencyWindow>,
    /// Timestamp of the latest completed ECDSA apiExit or endBackgroundProcessing
    latency_end_ns: Option<u64>,
    first_timestamp_ns: Option<u64>,
    last_timestamp_ns: Option<u64>,
    warnings: Vec<TraceWarning>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one classified line
    ///
    /// **Public** - called by the scan loop for every input line
    pub fn process_line(&mut self, line: usize, class: &LineClass, agg: &mut Aggregator) {
        match class {
            LineClass::Skipped => {}
            LineClass::Malformed(e) => {
                self.warn(Some(line), WarningKind::MalformedRecord(e.clone()));
            }
            LineClass::Unknown { timestamp_ns } => {
                self.touch(*timestamp_ns);
                self.warn(Some(line), WarningKind::UnknownTracepoint);
            }
            LineClass::Event(event) => self.process_event(line, event, agg),
        }
    }

    /// Feed one recognized tracepoint
    pub fn process_event(&mut self, line: usize, event: &TraceEvent, agg: &mut Aggregator) {
        self.touch(event.timestamp_ns);

        if event.kind == TracepointKind::EcdsaApiEntry {
            self.roll_latency_window(line, event, agg);
        }

        match event.kind.edge() {
            Edge::Open => self.open(line, event),
            Edge::Close => self.close(line, event, agg),
        }
    }

    /// Close out the run: warn about unfinished calls and flush the last
    /// ECDSA latency window
    pub fn finish(&mut self, agg: &mut Aggregator) {
        for channel in Channel::ALL {
            if let Some(pending) = self.pending[channel.index()].take() {
                debug!(
                    "{} pending since line {} at end of input",
                    channel.close_kind(),
                    pending.line
                );
                self.warn(None, WarningKind::MissingCloseAtEof { kind: channel.close_kind() });
            }
        }

        if let Some(window) = self.latency_window.take() {
            self.close_latency_window(window, agg);
        }
    }

    /// Currently pending open on `channel`
    pub fn pending(&self, channel: Channel) -> Option<&PendingCall> {
        self.pending[channel.index()].as_ref()
    }

    pub fn warnings(&self) -> &[TraceWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<TraceWarning> {
        self.warnings
    }

    pub fn first_timestamp_ns(&self) -> Option<u64> {
        self.first_timestamp_ns
    }

    pub fn last_timestamp_ns(&self) -> Option<u64> {
        self.last_timestamp_ns
    }

    fn open(&mut self, line: usize, event: &TraceEvent) {
        let channel = event.kind.channel();
        let slot = &mut self.pending[channel.index()];

        let previous = slot.replace(PendingCall {
            start_ns: event.timestamp_ns,
            function_id: event.function_id,
            line,
        });

        match channel {
            Channel::SeApi => self.se_api_fn = event.function_id,
            Channel::EcdsaApi => self.ecdsa_api_fn = event.function_id,
            _ => {}
        }

        if previous.is_some() {
            self.warn(Some(line), WarningKind::DuplicateOpen { kind: event.kind });
        }
    }

    fn close(&mut self, line: usize, event: &TraceEvent, agg: &mut Aggregator) {
        let channel = event.kind.channel();

        let Some(pending) = self.pending[channel.index()].take() else {
            self.warn(Some(line), WarningKind::UnmatchedClose { kind: event.kind });
            return;
        };

        // Lenient: a mismatched close is still timed against the pending open
        if pending.function_id != event.function_id {
            self.warn(
                Some(line),
                WarningKind::FunctionMismatch {
                    kind: event.kind,
                    expected: pending.function_id,
                    found: event.function_id,
                },
            );
        }

        if event.timestamp_ns < pending.start_ns {
            debug!(
                "{} on line {} is earlier than its open on line {}, clamping to 0",
                event.kind, line, pending.line
            );
        }

        let enclosing_id = match channel {
            Channel::SeApi | Channel::EcdsaApi => pending.function_id,
            _ => {
                let enclosing = match channel.layer() {
                    Layer::Se => self.se_api_fn,
                    Layer::Ecdsa => self.ecdsa_api_fn,
                };
                if enclosing == NO_FUNCTION_ID {
                    debug!(
                        "{} on line {} has no enclosing {:?} apiEntry",
                        event.kind,
                        line,
                        channel.layer()
                    );
                }
                enclosing
            }
        };

        agg.record(&CompletedCall {
            channel,
            function_id: pending.function_id,
            enclosing_id,
            duration_ns: event.timestamp_ns.saturating_sub(pending.start_ns),
        });

        if matches!(channel, Channel::EcdsaApi | Channel::EcdsaBackground) {
            self.latency_end_ns = Some(event.timestamp_ns);
        }
    }

    /// A new ECDSA apiEntry ends the previous latency window and opens a new one
    fn roll_latency_window(&mut self, line: usize, event: &TraceEvent, agg: &mut Aggregator) {
        if let Some(window) = self.latency_window.take() {
            self.close_latency_window(window, agg);
        }

        self.latency_window = Some(LatencyWindow {
            function_id: event.function_id,
            start_ns: event.timestamp_ns,
            line,
        });
    }

    fn close_latency_window(&mut self, window: LatencyWindow, agg: &mut Aggregator) {
        match self.latency_end_ns {
            Some(end) if end >= window.start_ns => {
                agg.record_outer_latency(window.function_id, end - window.start_ns);
            }
            _ => self.warn(
                Some(window.line),
                WarningKind::IncompleteLatencyWindow { function_id: window.function_id },
            ),
        }
    }

    fn touch(&mut self, timestamp_ns: u64) {
        self.first_timestamp_ns.get_or_insert(timestamp_ns);
        self.last_timestamp_ns = Some(timestamp_ns);
    }

    fn warn(&mut self, line: Option<usize>, kind: WarningKind) {
        let warning = TraceWarning { line, kind };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}
