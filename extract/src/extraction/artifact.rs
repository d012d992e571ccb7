//! Storage for the sanitized-input artifact of each run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised while persisting an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The correlation id cannot address an artifact.
    #[error("invalid correlation id '{id}': {reason}")]
    InvalidId {
        /// The rejected id.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Writing the artifact failed.
    #[error("failed to write artifact {}: {source}", .path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Write target for sanitized inputs, addressed by correlation id.
///
/// Writes overwrite any earlier artifact with the same id.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `text` under `correlation_id`.
    async fn persist(&self, correlation_id: &str, text: &str) -> Result<(), ArtifactError>;
}

/// Rejects ids that are empty or could escape the store's namespace.
pub fn validate_correlation_id(id: &str) -> Result<(), ArtifactError> {
    let reason = if id.trim().is_empty() {
        "must not be empty"
    } else if id.contains(['/', '\\']) {
        "must not contain path separators"
    } else if id.contains("..") {
        "must not contain '..'"
    } else if id.contains('\0') {
        "must not contain NUL"
    } else {
        return Ok(());
    };
    Err(ArtifactError::InvalidId {
        id: id.to_string(),
        reason,
    })
}

/// Stores artifacts as `<dir>/<id>_cleaned_input.txt`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `dir`; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for `correlation_id`.
    #[must_use]
    pub fn path_for(&self, correlation_id: &str) -> PathBuf {
        self.dir.join(format!("{correlation_id}_cleaned_input.txt"))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn persist(&self, correlation_id: &str, text: &str) -> Result<(), ArtifactError> {
        validate_correlation_id(correlation_id)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ArtifactError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(correlation_id);
        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "Saved cleaned input");
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, String>>,
}

impl MemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the artifact stored under `correlation_id`.
    pub async fn get(&self, correlation_id: &str) -> Option<String> {
        self.artifacts.lock().await.get(correlation_id).cloned()
    }

    /// Number of stored artifacts.
    pub async fn len(&self) -> usize {
        self.artifacts.lock().await.len()
    }

    /// Returns `true` if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.artifacts.lock().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn persist(&self, correlation_id: &str, text: &str) -> Result<(), ArtifactError> {
        validate_correlation_id(correlation_id)?;
        self.artifacts
            .lock()
            .await
            .insert(correlation_id.to_string(), text.to_string());
        Ok(())
    }
}

#[async_trait]
impl<S: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<S> {
    async fn persist(&self, correlation_id: &str, text: &str) -> Result<(), ArtifactError> {
        (**self).persist(correlation_id, text).await
    }
}
