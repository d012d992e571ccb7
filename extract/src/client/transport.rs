//! The boundary to the remote model service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::schema::SchemaDescriptor;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Task instructions.
    System,
    /// The content to operate on.
    User,
}

/// A single chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the message is from.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One request as handed to a [`ModelTransport`].
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Ordered messages, system first.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Schema the response must conform to, when structured output is requested.
    pub schema: Option<SchemaDescriptor>,
}

impl ModelRequest {
    /// Whether the transport must return schema-conformant output.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        self.schema.is_some()
    }
}

/// What the service sent back.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A parsed, schema-conformant object.
    Structured(Value),
    /// Free-text completion.
    Text(String),
}

/// Category of a non-timeout service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFailureKind {
    /// Credentials missing or rejected.
    Auth,
    /// The service rejected the request as malformed.
    InvalidRequest,
    /// The service throttled the caller.
    RateLimited,
    /// The service failed internally.
    Server,
    /// The model declined to answer.
    Refusal,
    /// The response could not be decoded.
    Decode,
    /// Anything else.
    Other,
}

/// A failure that must not be retried.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct ServiceFailure {
    /// Failure category.
    pub kind: ServiceFailureKind,
    /// Human-readable detail from the service or transport.
    pub message: String,
}

impl ServiceFailure {
    /// Creates a failure of the given kind.
    #[must_use]
    pub fn new(kind: ServiceFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors a transport can report.
///
/// Only [`TransportError::Timeout`] is retried by the model client.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The call did not complete within its deadline.
    #[error("model request timed out: {message}")]
    Timeout {
        /// Deadline that expired, if known.
        after: Option<Duration>,
        /// Transport detail.
        message: String,
    },

    /// Any other failure.
    #[error("model service error: {0}")]
    Fatal(#[from] ServiceFailure),
}

impl TransportError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(after: Option<Duration>, message: impl Into<String>) -> Self {
        Self::Timeout {
            after,
            message: message.into(),
        }
    }

    /// Creates a fatal error.
    #[must_use]
    pub fn fatal(kind: ServiceFailureKind, message: impl Into<String>) -> Self {
        Self::Fatal(ServiceFailure::new(kind, message))
    }

    /// Returns `true` for errors the client retries.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A configured connection to a remote model service.
///
/// Credentials and endpoint selection belong to the implementation; the
/// model client only sees requests and replies.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Sends one request and waits for the reply.
    async fn send(&self, request: &ModelRequest) -> Result<ModelReply, TransportError>;

    /// Whether the service itself guarantees schema-conformant structured
    /// replies. When `false` the client validates replies locally.
    fn enforces_schema(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: ModelTransport + ?Sized> ModelTransport for Arc<T> {
    async fn send(&self, request: &ModelRequest) -> Result<ModelReply, TransportError> {
        (**self).send(request).await
    }

    fn enforces_schema(&self) -> bool {
        (**self).enforces_schema()
    }
}

#[async_trait]
impl<T: ModelTransport + ?Sized> ModelTransport for Box<T> {
    async fn send(&self, request: &ModelRequest) -> Result<ModelReply, TransportError> {
        (**self).send(request).await
    }

    fn enforces_schema(&self) -> bool {
        (**self).enforces_schema()
    }
}
