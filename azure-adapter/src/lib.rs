//! Rust adapter for Azure OpenAI chat completions.
//!
//! This crate provides configuration discovery, request construction and
//! execution against an Azure OpenAI deployment, with support for
//! schema-constrained (`json_schema`) structured outputs and per-request
//! deadlines.

/// Request URL and body construction.
pub mod body;
/// Resolution of endpoint, key, deployment and API version.
pub mod discovery;
/// Error types returned by adapter operations.
pub mod error;
/// HTTP execution with deadlines and response decoding.
pub mod request;
/// Shared data types for configuration, requests and responses.
pub mod types;

pub use discovery::{
    discover_config, API_KEY_ENV_VAR, API_VERSION_ENV_VAR, DEPLOYMENT_ENV_VAR, ENDPOINT_ENV_VAR,
};
pub use error::AzureError;
pub use request::send_chat;
pub use types::*;

/// High-level client for one Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureOpenAi {
    http: reqwest::Client,
    config: AzureConfig,
}

impl AzureOpenAi {
    /// Creates a client for the given configuration.
    #[must_use]
    pub fn new(config: AzureConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a client from the `AZURE_OPENAI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AzureError::MissingConfig` if the endpoint or key is unset.
    pub fn from_env() -> Result<Self, AzureError> {
        discover_config().map(Self::new)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AzureConfig {
        &self.config
    }

    /// Sends a conversation and returns the assistant's answer.
    ///
    /// With a `schema` the answer is parsed JSON; without one it is free text.
    ///
    /// # Errors
    ///
    /// Returns `AzureError::Timeout` when the deadline passes, `AzureError::Status`
    /// for non-success responses, and `AzureError::Decode` or
    /// `AzureError::Refusal` when the answer cannot be used.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        schema: Option<JsonSchemaFormat>,
    ) -> Result<ChatOutput, AzureError> {
        let body = body::build_body(messages, temperature, schema);
        send_chat(&self.http, &self.config, &body).await
    }
}
