//! Orchestration of one extraction run: sanitize, persist, invoke, normalize.

use tokio::time::Instant;

use super::artifact::ArtifactStore;
use super::config::ExtractionConfig;
use super::error::ExtractionError;
use super::metrics::{estimate_tokens, ExtractionMetrics};
use super::record::{normalize_record, FlatRecord};
use super::request::ExtractionRequest;
use crate::client::{InvocationParams, ModelClient, ModelError, ModelOutput, ModelTransport};
use crate::sanitize::Sanitizer;

/// Runs extraction requests end to end.
///
/// The orchestrator is fail-fast: it adds no retries of its own, and any
/// persistence or model failure ends the run.
pub struct ExtractionOrchestrator<T, S> {
    client: ModelClient<T>,
    store: S,
    sanitizer: Sanitizer,
    config: ExtractionConfig,
}

impl<T: ModelTransport, S: ArtifactStore> ExtractionOrchestrator<T, S> {
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(client: ModelClient<T>, store: S) -> Self {
        Self {
            client,
            store,
            sanitizer: Sanitizer::new(),
            config: ExtractionConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the sanitizer.
    #[must_use]
    pub const fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// The artifact store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs one request and returns the flat record.
    ///
    /// # Errors
    ///
    /// See [`run_with_metrics`](Self::run_with_metrics).
    pub async fn run(&self, request: &ExtractionRequest) -> Result<FlatRecord, ExtractionError> {
        self.run_with_metrics(request).await.map(|(record, _)| record)
    }

    /// Runs one request and returns the flat record with run metrics.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Persistence` if the sanitized input cannot be
    /// stored (the model is not called), `ExtractionError::Model` if the model
    /// client fails, and `ExtractionError::NotAnObject` if the reply is not a
    /// JSON object.
    pub async fn run_with_metrics(
        &self,
        request: &ExtractionRequest,
    ) -> Result<(FlatRecord, ExtractionMetrics), ExtractionError> {
        let start = Instant::now();
        let correlation_id = request.correlation_id();
        tracing::info!(correlation_id, "Starting extraction run");

        let (sanitized, degraded) = match self.sanitizer.try_clean(request.raw_input()) {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(correlation_id, error = %e, "Sanitization degraded to empty input");
                (String::new(), true)
            }
        };

        self.store
            .persist(correlation_id, &sanitized)
            .await
            .map_err(|source| ExtractionError::Persistence {
                correlation_id: correlation_id.to_string(),
                source,
            })?;

        let params = InvocationParams::new(request.system_instructions(), sanitized.as_str())
            .structured(request.schema().clone())
            .with_temperature(self.config.temperature)
            .with_max_retries(self.config.max_retries);

        let completion = self
            .client
            .invoke(&params)
            .await
            .map_err(|source| model_failure(correlation_id, source))?;

        let attempts = completion.attempts;
        let value = match completion.output {
            ModelOutput::Structured(value) => value,
            ModelOutput::Text(text) => {
                return Err(model_failure(
                    correlation_id,
                    ModelError::UnexpectedOutput {
                        attempt: attempts,
                        text,
                    },
                ))
            }
        };
        let output_text = value.to_string();

        let record = normalize_record(value, request.schema().name()).map_err(|found| {
            ExtractionError::NotAnObject {
                correlation_id: correlation_id.to_string(),
                found,
            }
        })?;

        let metrics = ExtractionMetrics {
            total_attempts: attempts,
            wall_time: start.elapsed(),
            sanitized_chars: sanitized.chars().count(),
            sanitization_degraded: degraded,
            estimated_input_tokens: estimate_tokens(request.system_instructions())
                + estimate_tokens(&sanitized),
            estimated_output_tokens: estimate_tokens(&output_text),
        };

        tracing::info!(
            correlation_id,
            attempts,
            fields = record.len(),
            wall_time_ms = u64::try_from(metrics.wall_time.as_millis()).unwrap_or(u64::MAX),
            "Extraction run finished"
        );

        Ok((record, metrics))
    }
}

fn model_failure(correlation_id: &str, source: ModelError) -> ExtractionError {
    tracing::error!(correlation_id, error = %source, "Model invocation failed");
    ExtractionError::Model {
        correlation_id: correlation_id.to_string(),
        source,
    }
}
