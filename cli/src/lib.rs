#![deny(missing_docs)]
//! Command-line runner for `scrape-extract`.
//!
//! Wires the extraction pipeline to Azure OpenAI, persists the sanitized
//! input under an intermediate directory and writes the record as CSV.

/// Model transports backed by real services.
pub mod adapters;
/// Error types for the runner.
pub mod errors;
/// JSON and CSV rendering of records.
pub mod output;
/// The `run` and `clean` commands.
pub mod run;

pub use adapters::azure::AzureTransport;
pub use errors::CliError;
pub use run::{run_clean, run_extraction, RunConfig};
