//! Error types for extraction runs.

use thiserror::Error;

use super::artifact::ArtifactError;
use crate::client::ModelError;

/// Errors that end an extraction run.
///
/// Every variant carries the correlation id of the failed run.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The sanitized input could not be persisted; the model was not called.
    #[error("run '{correlation_id}': failed to persist sanitized input: {source}")]
    Persistence {
        /// Correlation id of the run.
        correlation_id: String,
        /// Store failure.
        #[source]
        source: ArtifactError,
    },

    /// The model client failed.
    #[error("run '{correlation_id}': {source}")]
    Model {
        /// Correlation id of the run.
        correlation_id: String,
        /// Client failure, unchanged.
        #[source]
        source: ModelError,
    },

    /// The structured reply was not a JSON object.
    #[error("run '{correlation_id}': structured reply is a {found}, expected an object")]
    NotAnObject {
        /// Correlation id of the run.
        correlation_id: String,
        /// JSON type actually received.
        found: &'static str,
    },
}

impl ExtractionError {
    /// Correlation id of the failed run.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Persistence { correlation_id, .. }
            | Self::Model { correlation_id, .. }
            | Self::NotAnObject { correlation_id, .. } => correlation_id,
        }
    }

    /// Model attempts consumed before the failure, if the model was reached.
    #[must_use]
    pub const fn attempts(&self) -> Option<usize> {
        match self {
            Self::Model { source, .. } => source.attempts(),
            Self::Persistence { .. } | Self::NotAnObject { .. } => None,
        }
    }

    /// The model error, if the model client failed.
    #[must_use]
    pub const fn model_error(&self) -> Option<&ModelError> {
        match self {
            Self::Model { source, .. } => Some(source),
            _ => None,
        }
    }
}
