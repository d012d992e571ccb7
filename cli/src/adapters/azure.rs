use crate::errors::CliError;
use async_trait::async_trait;
use azure_openai_adapter::discovery::resolve_config;
use azure_openai_adapter::{AzureError, AzureOpenAi, ChatMessage, ChatOutput, JsonSchemaFormat};
use scrape_extract::client::{
    Message, ModelReply, ModelRequest, ModelTransport, Role, ServiceFailureKind, TransportError,
};

/// A [`ModelTransport`] backed by an Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureTransport {
    /// The underlying HTTP client.
    pub client: AzureOpenAi,
    verify_locally: bool,
}

impl AzureTransport {
    /// Wraps a configured client.
    #[must_use]
    pub const fn new(client: AzureOpenAi) -> Self {
        Self {
            client,
            verify_locally: false,
        }
    }

    /// Builds a transport from the `AZURE_OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a transport from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        Ok(Self::new(AzureOpenAi::new(resolve_config(lookup)?)))
    }

    /// Validates structured replies against the schema on this side as well.
    ///
    /// Useful when schemas are sent with `strict: false`, which the service
    /// treats as a hint only.
    #[must_use]
    pub const fn with_local_validation(mut self, enabled: bool) -> Self {
        self.verify_locally = enabled;
        self
    }
}

#[async_trait]
impl ModelTransport for AzureTransport {
    async fn send(&self, request: &ModelRequest) -> Result<ModelReply, TransportError> {
        let messages = request.messages.iter().map(to_chat_message).collect();
        let schema = request.schema.as_ref().map(|s| JsonSchemaFormat {
            name: s.name().to_string(),
            schema: s.schema().clone(),
            strict: s.strict(),
        });

        match self.client.chat(messages, request.temperature, schema).await {
            Ok(ChatOutput::Json(value)) => Ok(ModelReply::Structured(value)),
            Ok(ChatOutput::Text(text)) => Ok(ModelReply::Text(text)),
            Err(e) => Err(classify(e, self.client.config().timeout)),
        }
    }

    fn enforces_schema(&self) -> bool {
        !self.verify_locally
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
    };
    ChatMessage::new(role, message.content.clone())
}

/// Maps an adapter error onto the retry taxonomy: only timeouts are retryable.
#[must_use]
pub fn classify(error: AzureError, deadline: std::time::Duration) -> TransportError {
    if error.is_timeout() {
        let after = match &error {
            AzureError::Timeout(d) => Some(*d),
            _ => Some(deadline),
        };
        return TransportError::timeout(after, error.to_string());
    }

    let kind = match &error {
        AzureError::Status { status, .. } => match status {
            401 | 403 => ServiceFailureKind::Auth,
            400 | 404 | 422 => ServiceFailureKind::InvalidRequest,
            429 => ServiceFailureKind::RateLimited,
            500..=599 => ServiceFailureKind::Server,
            _ => ServiceFailureKind::Other,
        },
        AzureError::MissingConfig(_) | AzureError::InvalidConfig(_) => ServiceFailureKind::Auth,
        AzureError::Refusal(_) => ServiceFailureKind::Refusal,
        AzureError::Decode(_) | AzureError::EmptyResponse => ServiceFailureKind::Decode,
        AzureError::Http(_) | AzureError::Timeout(_) => ServiceFailureKind::Other,
    };
    TransportError::fatal(kind, error.to_string())
}
