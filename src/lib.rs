//! V2X Trace Analyzer
//!
//! Latency and throughput analysis of trace logs recorded from the
//! V2X secure-element stack: the `v2xsehsm` SE API, the `ecdsa`
//! verification library, the HSM calls both make, and raw system calls.
//!
//! This crate provides the core implementation for the
//! `v2x-profile` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! babeltrace ~/lttng-traces/session > trace.txt
//! v2x-profile trace.txt
//! ```
//!
//! The library can also be driven directly:
//!
//! ```
//! use v2x_trace_analyzer::aggregator::analyze_str;
//! use v2x_trace_analyzer::output::generate_report;
//!
//! let trace = "[00:00:01.000000000] v2xsehsm:apiEntry apiFunctionID = 257\n\
//!              [00:00:01.050000000] v2xsehsm:apiExit apiFunctionID = 257\n";
//! let analysis = analyze_str(trace).unwrap();
//! assert_eq!(analysis.aggregator.se.total, 50_000_000);
//! print!("{}", generate_report(&analysis));
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
