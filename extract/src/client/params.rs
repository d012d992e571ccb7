//! Per-call invocation parameters.

use super::schema::SchemaDescriptor;
use super::transport::{Message, ModelRequest};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default ceiling on timed-out attempts.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Parameters for a single [`ModelClient::invoke`](super::ModelClient::invoke) call.
#[derive(Debug, Clone)]
pub struct InvocationParams {
    /// Task instructions; omitted from the request when empty.
    pub system_instruction: String,
    /// Content to operate on; omitted from the request when empty.
    pub user_instruction: String,
    /// Contract for structured mode.
    pub schema: Option<SchemaDescriptor>,
    /// Sampling randomness (default 0.2).
    pub temperature: f32,
    /// Maximum number of attempts when the service times out (default 3).
    pub max_retries: usize,
    /// Require schema-conformant output instead of free text (default off).
    pub structured_mode: bool,
}

impl InvocationParams {
    /// Creates free-text parameters with default temperature and retry ceiling.
    #[must_use]
    pub fn new(system_instruction: impl Into<String>, user_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_instruction: user_instruction.into(),
            schema: None,
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
            structured_mode: false,
        }
    }

    /// Attaches a schema without switching to structured mode.
    #[must_use]
    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Attaches a schema and switches to structured mode.
    #[must_use]
    pub fn structured(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self.structured_mode = true;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the retry ceiling.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builds the ordered message list: system first, then user, skipping empties.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_instruction.is_empty() {
            messages.push(Message::system(self.system_instruction.as_str()));
        }
        if !self.user_instruction.is_empty() {
            messages.push(Message::user(self.user_instruction.as_str()));
        }
        messages
    }

    /// Builds the request sent on every attempt.
    #[must_use]
    pub fn to_request(&self) -> ModelRequest {
        ModelRequest {
            messages: self.messages(),
            temperature: self.temperature,
            schema: if self.structured_mode {
                self.schema.clone()
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::Role;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let params = InvocationParams::new("sys", "user");
        assert!((params.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(params.max_retries, 3);
        assert!(!params.structured_mode);
        assert!(params.schema.is_none());
    }

    #[test]
    fn test_messages_order_system_first() {
        let messages = InvocationParams::new("sys", "user").messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "user");
    }

    #[test]
    fn test_empty_instructions_are_omitted() {
        let only_user = InvocationParams::new("", "user").messages();
        assert_eq!(only_user, vec![Message::user("user")]);

        let only_system = InvocationParams::new("sys", "").messages();
        assert_eq!(only_system, vec![Message::system("sys")]);

        assert!(InvocationParams::new("", "").messages().is_empty());
    }

    #[test]
    fn test_schema_only_sent_in_structured_mode() {
        let schema = SchemaDescriptor::new("record", json!({"type": "object"}));

        let free_text = InvocationParams::new("s", "u").with_schema(schema.clone());
        assert!(!free_text.to_request().is_structured());

        let structured = InvocationParams::new("s", "u").structured(schema);
        let request = structured.to_request();
        assert!(request.is_structured());
        assert_eq!(request.schema.as_ref().map(SchemaDescriptor::name), Some("record"));
    }
}
