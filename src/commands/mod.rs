//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod analyze;
pub mod models;

pub use analyze::{execute_analyze, validate_args};
pub use models::AnalyzeArgs;
