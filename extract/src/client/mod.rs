//! Model invocation with bounded retry on timeouts.
//!
//! - [`ModelClient`] - drives one invocation against an injected transport
//! - [`ModelTransport`] - the remote service boundary
//! - [`InvocationParams`] - per-call options
//! - [`SchemaDescriptor`] - structured-mode contract
//! - [`ModelError`] - typed failures (exhausted, fatal, schema violation)

pub mod error;
pub mod params;
pub mod retry;
pub mod schema;
pub mod transport;

pub use error::{AttemptRecord, ModelError};
pub use params::{InvocationParams, DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE};
pub use retry::{BackoffPolicy, RetryPhase, RetryState, TimeoutTransition};
pub use schema::SchemaDescriptor;
pub use transport::{
    Message, ModelReply, ModelRequest, ModelTransport, Role, ServiceFailure, ServiceFailureKind,
    TransportError,
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;

/// Result payload of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// Schema-conformant object (structured mode).
    Structured(Value),
    /// Raw completion text (free-text mode).
    Text(String),
}

impl ModelOutput {
    /// Returns the structured value, if any.
    #[must_use]
    pub fn into_structured(self) -> Option<Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if any.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

/// A successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// What the model produced.
    pub output: ModelOutput,
    /// Attempts consumed, including the successful one.
    pub attempts: usize,
}

/// Wraps a [`ModelTransport`] with the retry discipline.
///
/// Only timeouts are retried, with exponential backoff. Any other failure ends
/// the invocation immediately. The client keeps no state between calls, so one
/// instance can serve many invocations.
#[derive(Debug, Clone)]
pub struct ModelClient<T> {
    transport: T,
    backoff: BackoffPolicy,
}

impl<T: ModelTransport> ModelClient<T> {
    /// Creates a client with the default backoff (1 s unit).
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Replaces the backoff policy (fluent builder pattern).
    #[must_use]
    pub const fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Invokes the model.
    ///
    /// In structured mode the reply is returned as [`ModelOutput::Structured`];
    /// it is validated locally only when the transport does not enforce schemas.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::RetryExhausted` when every attempt timed out,
    /// `ModelError::Fatal` on the first non-timeout failure,
    /// `ModelError::SchemaViolation` / `ModelError::UnexpectedOutput` when a
    /// structured reply is unusable, and `ModelError::InvalidInvocation` when
    /// no request could be built.
    pub async fn invoke(&self, params: &InvocationParams) -> Result<Completion, ModelError> {
        let request = validate(params)?;
        let start = Instant::now();
        let mut state = RetryState::new(params.max_retries, self.backoff);
        let mut history: Vec<AttemptRecord> = Vec::new();

        tracing::info!(
            structured = params.structured_mode,
            messages = request.messages.len(),
            max_retries = params.max_retries,
            "Invoking model"
        );

        while let Some(attempt) = state.begin_attempt() {
            tracing::debug!(attempt, max_retries = params.max_retries, "Model call attempt");

            let error = match self.transport.send(&request).await {
                Ok(reply) => {
                    let output = self.accept(reply, &request, attempt).inspect_err(|_| {
                        state.on_fatal();
                    })?;
                    state.on_success();
                    tracing::debug!(attempt, "Model call succeeded");
                    return Ok(Completion {
                        output,
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            match error {
                TransportError::Timeout { message, .. } => {
                    let transition = state.on_timeout();
                    let backoff = match transition {
                        TimeoutTransition::Retry(delay) => Some(delay),
                        TimeoutTransition::Exhausted => None,
                    };
                    history.push(AttemptRecord {
                        attempt_number: attempt,
                        error: message,
                        backoff,
                        elapsed: start.elapsed(),
                    });
                    if let Some(delay) = backoff {
                        tracing::warn!(
                            attempt,
                            max_retries = params.max_retries,
                            backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "Model call timed out, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                TransportError::Fatal(source) => {
                    state.on_fatal();
                    tracing::error!(attempt, error = %source, "Model call failed");
                    return Err(ModelError::Fatal { attempt, source });
                }
            }
        }

        tracing::error!(
            attempts = state.attempt_count(),
            "Model request timed out after maximum retries"
        );
        Err(ModelError::RetryExhausted {
            attempts: state.attempt_count(),
            max_retries: state.max_retries(),
            history,
        })
    }

    /// Invokes the model in structured mode and deserializes the result.
    ///
    /// Forces `structured_mode`; `params.schema` must be set.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke), plus `ModelError::Deserialize` when
    /// the value does not fit `R`.
    pub async fn invoke_typed<R: DeserializeOwned>(
        &self,
        params: &InvocationParams,
    ) -> Result<R, ModelError> {
        let mut params = params.clone();
        params.structured_mode = true;
        let completion = self.invoke(&params).await?;
        match completion.output {
            ModelOutput::Structured(value) => Ok(serde_json::from_value(value)?),
            ModelOutput::Text(text) => Err(ModelError::UnexpectedOutput {
                attempt: completion.attempts,
                text,
            }),
        }
    }

    fn accept(
        &self,
        reply: ModelReply,
        request: &ModelRequest,
        attempt: usize,
    ) -> Result<ModelOutput, ModelError> {
        let Some(schema) = &request.schema else {
            return Ok(match reply {
                ModelReply::Text(text) => ModelOutput::Text(text),
                ModelReply::Structured(value) => ModelOutput::Text(value.to_string()),
            });
        };

        let value = match reply {
            ModelReply::Structured(value) => value,
            ModelReply::Text(text) => return Err(ModelError::UnexpectedOutput { attempt, text }),
        };

        if !self.transport.enforces_schema() {
            let errors = schema.validate(&value);
            if !errors.is_empty() {
                tracing::error!(
                    attempt,
                    schema = schema.name(),
                    "Structured reply failed validation"
                );
                return Err(ModelError::SchemaViolation {
                    schema: schema.name().to_string(),
                    errors,
                    attempt,
                });
            }
        }

        Ok(ModelOutput::Structured(value))
    }
}

fn validate(params: &InvocationParams) -> Result<ModelRequest, ModelError> {
    if params.max_retries == 0 {
        return Err(ModelError::InvalidInvocation(
            "max_retries must be at least 1".to_string(),
        ));
    }
    if params.structured_mode && params.schema.is_none() {
        return Err(ModelError::InvalidInvocation(
            "structured mode requires a schema".to_string(),
        ));
    }
    let request = params.to_request();
    if request.messages.is_empty() {
        return Err(ModelError::InvalidInvocation(
            "both system and user instructions are empty".to_string(),
        ));
    }
    Ok(request)
}
