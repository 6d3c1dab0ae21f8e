//! Report rendering.
//!
//! The analyzer's only output is the human-readable text report printed
//! to stdout.

pub mod report;

pub use report::generate_report;
