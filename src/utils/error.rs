//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while classifying a single trace line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing closing ']' after timestamp")]
    UnterminatedTimestamp,

    #[error("Invalid timestamp '{0}': expected HH:MM:SS.nnnnnnnnn")]
    InvalidTimestamp(String),
}

/// Errors that can occur while scanning a trace file
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to open trace file {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read trace input at line {line}: {source}")]
    ReadFailed {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

