//! Configuration for extraction runs.

use crate::client::{DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE};

/// Options the orchestrator forwards to the model client on every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionConfig {
    /// Sampling temperature (default: 0.2).
    pub temperature: f32,
    /// Maximum number of attempts when the model times out (default: 3).
    pub max_retries: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ExtractionConfig {
    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }
}
