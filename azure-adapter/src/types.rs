//! Shared data types for Azure OpenAI configuration, requests and responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deployment used when none is configured.
pub const DEFAULT_DEPLOYMENT: &str = "docs-dev-struct-4o";

/// API version supporting `json_schema` response formats.
pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

/// Connection settings for an Azure OpenAI resource.
#[derive(Clone)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// API key sent in the `api-key` header.
    pub api_key: String,
    /// Deployment (model) name.
    pub deployment: String,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl AzureConfig {
    /// Creates a configuration with default deployment, API version and a 60 s deadline.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the deployment name.
    #[must_use]
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A chat message in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message with the given role.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// `json_schema` response format payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    /// Schema name, `[A-Za-z0-9_-]` only.
    pub name: String,
    /// The JSON Schema document.
    pub schema: serde_json::Value,
    /// Whether the service must follow the schema exactly.
    pub strict: bool,
}

/// Requested output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text.
    Text,
    /// Schema-conformant JSON.
    JsonSchema {
        /// Schema definition.
        json_schema: JsonSchemaFormat,
    },
}

/// Body of a chat completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Conversation, system message first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output format, omitted for plain text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Body of a chat completions response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    /// Candidate answers.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token accounting.
    pub usage: Option<Usage>,
}

/// One candidate answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The assistant message.
    pub message: AssistantMessage,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// The assistant message of a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Generated text; JSON text in structured mode.
    pub content: Option<String>,
    /// Refusal explanation, when the model declined.
    pub refusal: Option<String>,
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub prompt_tokens: u64,
    /// Completion tokens.
    pub completion_tokens: u64,
    /// Sum of both.
    pub total_tokens: u64,
}

/// Outcome of a successful chat call.
#[derive(Debug, Clone)]
pub enum ChatOutput {
    /// Free-text answer.
    Text(String),
    /// Parsed structured answer.
    Json(serde_json::Value),
}
