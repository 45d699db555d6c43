//! Key/value storage port
//!
//! The persisted application state lives under a handful of fixed keys,
//! each holding one JSON document.

use async_trait::async_trait;
use serde_json::Value;

/// Keys used by the application.
pub mod keys {
    /// Workspaces, folders and requests.
    pub const WORKSPACES: &str = "api-workspaces";
    /// Environments and the active environment id.
    pub const ENVIRONMENTS: &str = "api-environments";
    /// Global variables.
    pub const GLOBAL_VARIABLES: &str = "api-global-variables";
    /// Request history.
    pub const REQUEST_HISTORY: &str = "api-request-history";
    /// Editor auto-save snapshot.
    pub const TEST_SUITE_AUTOSAVE: &str = "test-suite-autosave";
}

/// Errors that can occur in a key/value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key cannot be used by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistent string-keyed JSON storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `None` when the key was never written.
    ///
    /// # Errors
    /// Returns an error if the stored value cannot be read or parsed.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the value cannot be written.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Deletes a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    /// Returns an error if the value exists but cannot be removed.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and decodes a typed value.
///
/// # Errors
/// Returns an error if the value cannot be read or does not match `T`.
pub async fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))
}

/// Encodes and writes a typed value.
///
/// # Errors
/// Returns an error if the value cannot be encoded or written.
pub async fn save_json<T: serde::Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json =
        serde_json::to_value(value).map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
    store.set(key, json).await
}
