//! URL and request body construction for chat completions calls.

use crate::types::{AzureConfig, ChatMessage, ChatRequest, JsonSchemaFormat, ResponseFormat};

/// Builds the chat completions URL for the configured deployment.
#[must_use]
pub fn build_url(config: &AzureConfig) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        config.endpoint.trim_end_matches('/'),
        config.deployment,
        config.api_version
    )
}

/// Builds the request body.
///
/// When `schema` is given the request asks for a `json_schema` response
/// format; otherwise `response_format` is omitted and the model answers in
/// free text.
#[must_use]
pub fn build_body(
    messages: Vec<ChatMessage>,
    temperature: f32,
    schema: Option<JsonSchemaFormat>,
) -> ChatRequest {
    ChatRequest {
        messages,
        temperature,
        response_format: schema.map(|json_schema| ResponseFormat::JsonSchema { json_schema }),
    }
}
