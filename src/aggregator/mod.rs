//! Correlation of trace events and aggregation of their timings.
//!
//! This module transforms classified trace lines into:
//! - Correlated calls (open/close pairs per channel)
//! - Per-function and per-layer time totals
//! - Min/max latency per function

pub mod correlator;
pub mod scan;
pub mod stats;

// Re-export main types and functions
pub use correlator::{Correlator, PendingCall, TraceWarning, WarningKind};
pub use scan::{analyze_file, analyze_reader, analyze_str, Analysis};
pub use stats::{Aggregator, CallTimes, CompletedCall, FunctionTimes, LatencyRange, LayerTotals};
