//! Client-local key/value store backed by a single JSON file.
//!
//! The file holds one flat object of string keys to string values. Structured
//! values are stored JSON-encoded inside their string slot.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use study_core::model::{ProviderConfig, ProviderConfigDraft};
use tokio::sync::Mutex;

use crate::repository::{ConfigRepository, StorageError};

/// Key under which the provider configuration is stored.
pub const PROVIDER_CONFIG_KEY: &str = "provider-config";

pub struct LocalFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl LocalFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        Ok(items.remove(key))
    }

    /// Insert or replace a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be read, parsed, or written.
    pub async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value);
        self.write_all(&items).await
    }

    /// Remove a value; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be read, parsed, or written.
    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(items)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|err| StorageError::Io(err.to_string()))
    }
}

#[async_trait]
impl ConfigRepository for LocalFileStore {
    async fn get_config(&self) -> Result<Option<ProviderConfig>, StorageError> {
        let Some(raw) = self.get_item(PROVIDER_CONFIG_KEY).await? else {
            return Ok(None);
        };
        let draft: ProviderConfigDraft = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        draft
            .validate()
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_config(&self, config: &ProviderConfig) -> Result<(), StorageError> {
        let raw = serde_json::to_string(config)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.set_item(PROVIDER_CONFIG_KEY, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("absent.json"));
        assert!(store.get_item("anything").await.unwrap().is_none());
        assert!(store.get_config().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn items_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let store = LocalFileStore::new(&path);
        store.set_item("theme", "dark".into()).await.unwrap();
        store.set_item("lang", "en".into()).await.unwrap();
        store.remove_item("lang").await.unwrap();

        let reopened = LocalFileStore::new(&path);
        let theme = reopened.get_item("theme").await.unwrap();
        assert_eq!(theme.as_deref(), Some("dark"));
        assert!(reopened.get_item("lang").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = LocalFileStore::new(&path);
        let err = store.get_item("x").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
