use std::time::Duration;
use thiserror::Error;

/// Errors returned by Azure OpenAI adapter operations.
#[derive(Debug, Error)]
pub enum AzureError {
    /// A required setting was absent.
    #[error("Missing configuration: set {0}")]
    MissingConfig(&'static str),

    /// A setting was present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request did not complete within the configured deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure inside `reqwest`.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body or its content could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The model declined to answer.
    #[error("Model refused the request: {0}")]
    Refusal(String),

    /// The response carried no usable choice or content.
    #[error("Response contained no choices")]
    EmptyResponse,
}

impl AzureError {
    /// Returns `true` when the request did not complete within its deadline.
    ///
    /// Covers the adapter's own deadline, `reqwest` timeouts and HTTP 408.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            Self::Status { status, .. } => *status == 408,
            _ => false,
        }
    }
}
