use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use study_core::model::ProviderConfig;
use thiserror::Error;

use crate::blob::{BlobStore, InMemoryBlobStore};
use crate::local::LocalFileStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the provider configuration blob.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Fetch the stored configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read or decoded.
    async fn get_config(&self) -> Result<Option<ProviderConfig>, StorageError>;

    /// Replace the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the configuration cannot be written.
    async fn save_config(&self, config: &ProviderConfig) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    config: Arc<Mutex<Option<ProviderConfig>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigRepository for InMemoryRepository {
    async fn get_config(&self) -> Result<Option<ProviderConfig>, StorageError> {
        let guard = self
            .config
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_config(&self, config: &ProviderConfig) -> Result<(), StorageError> {
        let mut guard = self
            .config
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(config.clone());
        Ok(())
    }
}

/// Aggregates storage adapters behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub config: Arc<dyn ConfigRepository>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            config: Arc::new(InMemoryRepository::new()),
            blobs: Arc::new(InMemoryBlobStore::default()),
        }
    }

    /// Configuration kept in a local JSON file; blobs stay in memory.
    #[must_use]
    pub fn local_file(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            config: Arc::new(LocalFileStore::new(path)),
            blobs: Arc::new(InMemoryBlobStore::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::ProviderConfigDraft;

    #[tokio::test]
    async fn in_memory_round_trips_config() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_config().await.unwrap().is_none());

        let config = ProviderConfigDraft {
            project_id: Some("demo".into()),
            ..ProviderConfigDraft::default()
        }
        .validate()
        .unwrap();
        repo.save_config(&config).await.unwrap();

        let fetched = repo.get_config().await.unwrap().unwrap();
        assert_eq!(fetched.project_id(), Some("demo"));
    }

    #[test]
    fn storage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Storage>();
    }
}
