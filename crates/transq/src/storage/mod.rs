//! Persistence port for the queue and watch-folder documents.
//!
//! The substrate is a synchronous string-keyed store holding JSON documents.
//! [`DocumentRepository`] adds typed load/save on top so the queue store and
//! watch-folder manager never touch encoding or the concrete backend.

pub mod filesystem;
pub mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub use filesystem::FileStore;
pub use memory::MemoryStore;

/// Current queue document: `QueueItem[]`.
pub const QUEUE_KEY: &str = "translation_queue";
/// Queue document written by older releases: a flat list of paths.
pub const LEGACY_QUEUE_KEY: &str = "translation_queue_legacy";
/// Watch-folder document: `WatchFolderConfig[]`.
pub const WATCH_FOLDERS_KEY: &str = "watch_folders";

/// A synchronous string-keyed document store.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON documents over a [`KeyValueStore`].
#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for DocumentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository").finish_non_exhaustive()
    }
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads and decodes the document at `key`.
    ///
    /// Returns `Ok(None)` if the key is absent and `StorageError::Decode`
    /// if the stored text is not a valid document of type `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Encodes `value` and writes the whole document.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove_item(key)
    }

    /// Returns true if a document exists at `key`, valid or not.
    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.store.get_item(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_round_trip() {
        let repo = DocumentRepository::new(Arc::new(MemoryStore::new()));
        repo.save("numbers", &vec![1, 2, 3]).unwrap();

        let loaded: Option<Vec<i32>> = repo.load("numbers").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_repository_missing_key() {
        let repo = DocumentRepository::new(Arc::new(MemoryStore::new()));
        let loaded: Option<Vec<i32>> = repo.load("missing").unwrap();
        assert!(loaded.is_none());
        assert!(!repo.contains("missing").unwrap());
    }

    #[test]
    fn test_repository_malformed_document() {
        let store = Arc::new(MemoryStore::new());
        store.set_item("numbers", "{not json").unwrap();
        let repo = DocumentRepository::new(store);

        let err = repo.load::<Vec<i32>>("numbers").unwrap_err();
        assert!(matches!(err, StorageError::Decode { .. }));
        assert!(repo.contains("numbers").unwrap());
    }

    #[test]
    fn test_repository_remove() {
        let repo = DocumentRepository::new(Arc::new(MemoryStore::new()));
        repo.save("k", &"v").unwrap();
        repo.remove("k").unwrap();
        assert!(!repo.contains("k").unwrap());
    }
}
