//! File-backed session storage.
//!
//! The session lives in a single JSON object in the platform config
//! directory by default:
//! - Linux: ~/.config/bastion/session.json
//! - macOS: ~/Library/Application Support/bastion/session.json
//! - Windows: %APPDATA%/bastion/session.json

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bastion_application::ports::{SessionStorage, StorageError};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Entries = BTreeMap<String, String>;

/// Session storage writing one JSON file.
///
/// Every write goes to a sibling temp file that is renamed over the session
/// file, so readers see either the old or the new contents. Writes through
/// one instance are serialized; separate processes sharing the file are not
/// coordinated.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Creates a storage backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a storage at the default location.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the platform has no config
    /// directory.
    pub fn at_default_location() -> Result<Self, StorageError> {
        Self::default_path().map(Self::new).ok_or_else(|| {
            StorageError::Unavailable("could not determine config directory".to_string())
        })
    }

    /// Returns the default session file path, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bastion").join("session.json"))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("session"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_entries(&self) -> Result<Entries, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }

        from_json_bytes(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content =
            to_json_stable_bytes(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let temp = self.temp_path();
        fs::write(&temp, content).await?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read_entries().await?;
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        self.write_entries(&stored).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = match self.read_entries().await {
            Ok(stored) => stored,
            // A corrupt file is dropped entirely when the session is cleared.
            Err(StorageError::Serialization(_)) => Entries::new(),
            Err(e) => return Err(e),
        };
        for key in keys {
            stored.remove(*key);
        }
        self.write_entries(&stored).await
    }
}
