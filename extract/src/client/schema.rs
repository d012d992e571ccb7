//! Schema descriptors handed to the model service in structured mode.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const FALLBACK_NAME: &str = "response";

/// Declarative contract describing the fields and types of a structured result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    name: String,
    schema: Value,
    strict: bool,
}

impl SchemaDescriptor {
    /// Creates a descriptor from a raw JSON Schema.
    ///
    /// The name is reduced to `[A-Za-z0-9_-]`, which is what structured-output
    /// services accept.
    #[must_use]
    pub fn new(name: &str, schema: Value) -> Self {
        Self {
            name: sanitize_name(name),
            schema,
            strict: true,
        }
    }

    /// Derives a descriptor from a Rust type.
    ///
    /// The name comes from the schema title, falling back to `response`.
    #[must_use]
    pub fn for_type<T: JsonSchema>() -> Self {
        let schema = json!(schemars::schema_for!(T));
        let name = schema
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_NAME)
            .to_string();
        Self::new(&name, schema)
    }

    /// Sets whether the service should enforce the schema strictly.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JSON Schema document.
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    /// Whether strict enforcement is requested.
    #[must_use]
    pub const fn strict(&self) -> bool {
        self.strict
    }

    /// Validates `instance` against this schema.
    ///
    /// Returns every violation with its instance path; an empty vector means
    /// the instance conforms.
    #[must_use]
    pub fn validate(&self, instance: &Value) -> Vec<String> {
        match jsonschema::Validator::new(&self.schema) {
            Ok(validator) => validator
                .iter_errors(instance)
                .map(|error| format!("At path '{}': {}", error.instance_path, error))
                .collect(),
            Err(e) => vec![format!("Schema compilation error: {e}")],
        }
    }
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct ParserResponse {
        name: String,
        age: u32,
    }

    #[test]
    fn test_for_type_uses_title() {
        let descriptor = SchemaDescriptor::for_type::<ParserResponse>();
        assert_eq!(descriptor.name(), "ParserResponse");
        assert!(descriptor.strict());
        assert_eq!(descriptor.schema()["type"], "object");
    }

    #[test]
    fn test_name_is_sanitized() {
        assert_eq!(SchemaDescriptor::new("My Record!", json!({})).name(), "MyRecord");
        assert_eq!(SchemaDescriptor::new("???", json!({})).name(), "response");
    }

    #[test]
    fn test_validate_reports_violations() {
        let descriptor = SchemaDescriptor::for_type::<ParserResponse>();

        assert!(descriptor
            .validate(&json!({"name": "Ada", "age": 36}))
            .is_empty());

        let errors = descriptor.validate(&json!({"age": -1}));
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.contains("name")));
    }

    #[test]
    fn test_validate_reports_broken_schema() {
        let descriptor = SchemaDescriptor::new("broken", json!({"type": 12}));
        let errors = descriptor.validate(&json!({}));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Schema compilation error"));
    }
}
