//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{SessionStorage, StorageError};

/// Thread-safe in-memory session storage.
///
/// Nothing survives the process; used for tests and for callers that do not
/// want the session written to disk.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns all stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut stored = self.entries.write().await;
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut stored = self.entries.write().await;
        for key in keys {
            stored.remove(*key);
        }
        Ok(())
    }
}
