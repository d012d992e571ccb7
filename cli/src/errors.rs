use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the command-line runner.
#[derive(Debug, Error)]
pub enum CliError {
    /// The extraction run failed.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] scrape_extract::extraction::ExtractionError),

    /// The Azure OpenAI client could not be configured.
    #[error("Azure OpenAI configuration error: {0}")]
    Azure(#[from] azure_openai_adapter::AzureError),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The schema file is not a usable JSON Schema.
    #[error("Invalid schema file {path}: {reason}")]
    Schema {
        /// Schema file path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV output error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
