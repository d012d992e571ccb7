//! # scrape-extract
//!
//! Turn scraped HTML into schema-conformant records with an LLM.
//!
//! The pipeline has three parts:
//!
//! - [`sanitize`] strips markup down to text, keeping only anchors;
//! - [`client`] invokes the model with retry on timeouts;
//! - [`extraction`] wires both together and persists the sanitized input.
//!
//! ## Example
//!
//! ```no_run
//! # use scrape_extract::prelude::*;
//! # async fn example(transport: impl ModelTransport) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = ExtractionOrchestrator::new(
//!     ModelClient::new(transport),
//!     FsArtifactStore::new("intermediate"),
//! );
//!
//! let schema = SchemaDescriptor::new(
//!     "Listing",
//!     serde_json::json!({"type": "object", "properties": {"title": {"type": "string"}}}),
//! );
//! let request = ExtractionRequest::new(
//!     Some("<div><h1>Flat to let</h1></div>".to_string()),
//!     "Extract the listing title.",
//!     schema,
//!     "listing-1",
//! );
//!
//! let record = orchestrator.run(&request).await?;
//! println!("{}", record["title"]);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

/// Model invocation with retry.
pub mod client;

/// Extraction runs.
pub mod extraction;

/// Markup sanitization.
pub mod sanitize;

/// Commonly used types and traits.
pub mod prelude {
    pub use crate::client::{
        BackoffPolicy, Completion, InvocationParams, ModelClient, ModelError, ModelOutput,
        ModelReply, ModelRequest, ModelTransport, SchemaDescriptor, ServiceFailure,
        ServiceFailureKind, TransportError,
    };
    pub use crate::extraction::{
        ArtifactError, ArtifactStore, ExtractionConfig, ExtractionError, ExtractionMetrics,
        ExtractionOrchestrator, ExtractionRequest, FlatRecord, FsArtifactStore,
        MemoryArtifactStore,
    };
    pub use crate::sanitize::{clean, Sanitizer};
}
