//! The immutable input of one extraction run.

use crate::client::SchemaDescriptor;

/// Everything a run needs besides the model client and the artifact store.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    raw_input: Option<String>,
    system_instructions: String,
    schema: SchemaDescriptor,
    correlation_id: String,
}

impl ExtractionRequest {
    /// Creates a request.
    ///
    /// `raw_input` may be `None` (e.g. a page that failed to download); it is
    /// sanitized to an empty string.
    #[must_use]
    pub fn new(
        raw_input: Option<String>,
        system_instructions: impl Into<String>,
        schema: SchemaDescriptor,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            raw_input,
            system_instructions: system_instructions.into(),
            schema,
            correlation_id: correlation_id.into(),
        }
    }

    /// Raw scraped markup.
    #[must_use]
    pub fn raw_input(&self) -> Option<&str> {
        self.raw_input.as_deref()
    }

    /// Task instructions for the model.
    #[must_use]
    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    /// Target schema.
    #[must_use]
    pub const fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Identifier addressing this run's artifact.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
