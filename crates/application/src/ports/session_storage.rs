//! Session storage port
//!
//! A small key/value interface standing in for browser local storage.

use async_trait::async_trait;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The storage location could not be determined.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage for session data.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes all entries in one step: either every entry is stored or none.
    async fn set(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Removes the given keys. Missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
