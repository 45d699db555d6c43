//! File-backed key/value store.
//!
//! Each key is one JSON file in the data directory:
//! ```text
//! data_dir/
//!   api-workspaces.json
//!   api-environments.json
//!   api-global-variables.json
//!   api-request-history.json
//!   test-suite-autosave.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flowdeck_application::ports::{KeyValueStore, StorageError};
use serde_json::Value;
use tokio::fs;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Key/value store writing one pretty JSON file per key.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match from_json_bytes(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Keep the unreadable file for inspection; the next write starts over.
                let aside = path.with_extension("json.corrupt");
                match fs::rename(&path, &aside).await {
                    Ok(()) => tracing::warn!(key, moved_to = %aside.display(), "moved unreadable file aside"),
                    Err(rename) => tracing::warn!(key, error = %rename, "could not move unreadable file aside"),
                }
                Err(StorageError::Serialization(format!("{}: {e}", path.display())))
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let bytes = to_json_stable_bytes(&value).map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.root).await?;
        // Replace atomically.
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, bytes).await?;
        fs::rename(&temp, &path).await?;
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
