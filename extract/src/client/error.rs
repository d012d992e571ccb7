//! Model client errors with attempt history.

use std::time::Duration;

use thiserror::Error;

use super::transport::ServiceFailure;

/// Record of one timed-out attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// Timeout detail reported by the transport.
    pub error: String,
    /// Delay waited before the next attempt, `None` for the last one.
    pub backoff: Option<Duration>,
    /// Time since the invocation started, measured when the attempt failed.
    pub elapsed: Duration,
}

/// Errors returned by [`ModelClient`](super::ModelClient).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Every allowed attempt timed out.
    #[error("model request timed out on all {attempts} attempts (max: {max_retries})")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// Attempt ceiling.
        max_retries: usize,
        /// One entry per timed-out attempt.
        history: Vec<AttemptRecord>,
    },

    /// The service failed with a non-retryable error.
    #[error("model service failed at attempt {attempt}: {source}")]
    Fatal {
        /// Attempt on which the failure happened.
        attempt: usize,
        /// What the service reported.
        #[source]
        source: ServiceFailure,
    },

    /// A structured reply did not conform to the requested schema.
    #[error(
        "structured reply violates schema '{schema}' at attempt {attempt}: {}",
        .errors.join("; ")
    )]
    SchemaViolation {
        /// Schema name.
        schema: String,
        /// Validation messages with instance paths.
        errors: Vec<String>,
        /// Attempt that produced the reply.
        attempt: usize,
    },

    /// Structured mode was requested but the service answered with text.
    #[error("expected a structured reply but received text at attempt {attempt}")]
    UnexpectedOutput {
        /// Attempt that produced the reply.
        attempt: usize,
        /// The text received.
        text: String,
    },

    /// The parameters cannot produce a valid request.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    /// A structured reply could not be converted to the requested type.
    #[error("failed to deserialize structured reply: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl ModelError {
    /// Number of attempts consumed before the error, when known.
    #[must_use]
    pub const fn attempts(&self) -> Option<usize> {
        match self {
            Self::RetryExhausted { attempts, .. } => Some(*attempts),
            Self::Fatal { attempt, .. }
            | Self::SchemaViolation { attempt, .. }
            | Self::UnexpectedOutput { attempt, .. } => Some(*attempt),
            Self::InvalidInvocation(_) => Some(0),
            Self::Deserialize(_) => None,
        }
    }

    /// Returns `true` if the error came from retry exhaustion.
    #[must_use]
    pub const fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }
}
