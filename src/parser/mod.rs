//! Trace line parsing and tracepoint definitions.
//!
//! This module handles:
//! - Classifying raw trace lines
//! - Extracting timestamps and function IDs
//! - Defining the known tracepoint tags and function tables

pub mod functions;
pub mod line;
pub mod tracepoint;

// Re-export main types
pub use functions::{FunctionTable, ECDSA_FUNCTIONS, HSM_FUNCTIONS, SE_FUNCTIONS, SYSTEM_FUNCTIONS};
pub use line::{classify_line, extract_function_id, parse_timestamp_ns, LineClass, TraceEvent};
pub use tracepoint::{Channel, Edge, Layer, TracepointKind};
