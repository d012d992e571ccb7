//! Extraction pipeline built on the sanitizer and the model client.
//!
//! - [`ExtractionOrchestrator`] - sanitize, persist, invoke, normalize
//! - [`ExtractionRequest`] - immutable run input
//! - [`ExtractionError`] - typed run failures carrying the correlation id
//! - [`ArtifactStore`] - where sanitized inputs are written
//! - [`ExtractionMetrics`] - attempts, timing and token estimates

pub mod artifact;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod record;
pub mod request;

pub use artifact::{
    validate_correlation_id, ArtifactError, ArtifactStore, FsArtifactStore, MemoryArtifactStore,
};
pub use config::ExtractionConfig;
pub use error::ExtractionError;
pub use metrics::{estimate_tokens, ExtractionMetrics};
pub use orchestrator::ExtractionOrchestrator;
pub use record::{normalize_record, FlatRecord};
pub use request::ExtractionRequest;
