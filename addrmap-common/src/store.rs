//! Record store
//!
//! Persists the whole record collection as one JSON value under the `"users"`
//! key of a small key-value backend. Every mutation is a full
//! read-modify-write performed by the caller: two writers interleaving
//! `load → modify → save` can lose one of the updates (last write wins).

use crate::error::StoreError;
use crate::models::UserRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key holding the serialized record collection
pub const USERS_KEY: &str = "users";

/// String key-value persistence backend
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if it was never written
    async fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set_item(&self, key: &str, value: &str) -> io::Result<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set_item(key, value).await
    }
}

/// File-backed store: one `<key>.json` file per key under a root folder
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so readers
/// in this process never observe a half-written value.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn item_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn check_key(key: &str) -> io::Result<()> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key: {:?}", key),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Self::check_key(key)?;
        match tokio::fs::read_to_string(self.item_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        Self::check_key(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let target = self.item_path(key);
        let temp = target.with_extension("json.tmp");

        tokio::fs::write(&temp, value).await?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }

        debug!(path = %target.display(), bytes = value.len(), "Stored item");
        Ok(())
    }
}

/// In-process store, contents vanish with the value
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the persisted record collection
#[derive(Debug, Clone)]
pub struct RecordStore<S> {
    backend: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the full collection
    ///
    /// A missing key is an empty collection. Present data that does not
    /// parse, or holds out-of-range coordinates, is `StoreError::Corrupt`.
    pub async fn load(&self) -> Result<Vec<UserRecord>, StoreError> {
        let raw = self
            .backend
            .get_item(USERS_KEY)
            .await
            .map_err(|e| StoreError::ReadFailure(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        let records: Vec<UserRecord> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        for (index, record) in records.iter().enumerate() {
            record
                .coordinate()
                .map_err(|e| StoreError::Corrupt(format!("record {}: {}", index, e)))?;
        }

        debug!(count = records.len(), "Loaded records");
        Ok(records)
    }

    /// Load, logging and swallowing any failure as an empty collection
    ///
    /// For read-only consumers (map markers). Never use the result as the
    /// base of a write: it would overwrite a corrupt value with a fresh one.
    pub async fn load_or_empty(&self) -> Vec<UserRecord> {
        match self.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Could not load records, showing none");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted collection with `records`
    pub async fn save(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        for (index, record) in records.iter().enumerate() {
            record.coordinate().map_err(|e| {
                StoreError::WriteFailure(format!("refusing to persist record {}: {}", index, e))
            })?;
        }

        let json =
            serde_json::to_string(records).map_err(|e| StoreError::WriteFailure(e.to_string()))?;

        self.backend
            .set_item(USERS_KEY, &json)
            .await
            .map_err(|e| StoreError::WriteFailure(e.to_string()))?;

        debug!(count = records.len(), "Saved records");
        Ok(())
    }
}
