//! Configuration and constants for the analyzer.

/// Every trace record starts with a bracketed timestamp
pub const TRACE_RECORD_PREFIX: char = '[';

/// Name of the field carrying the traced function code
pub const FUNCTION_ID_FIELD: &str = "apiFunctionID";

/// Function ID used when a record carries no `apiFunctionID` field
pub const NO_FUNCTION_ID: u32 = 0;

// Time conversion
pub const NS_PER_SEC: u64 = 1_000_000_000;
pub const NS_PER_MS: f64 = 1_000_000.0;
