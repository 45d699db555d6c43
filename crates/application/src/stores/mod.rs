//! Persisted application state
//!
//! Each store keeps its state in memory and writes it through to a
//! [`KeyValueStore`](crate::ports::KeyValueStore) after every mutation.
//! A mutation whose write fails is rolled back, so memory never shows
//! state that was not stored.

mod environment;
mod history;
mod workspace;

pub use environment::EnvironmentStore;
pub use history::HistoryStore;
pub use workspace::WorkspaceStore;

use serde::de::DeserializeOwned;

use crate::ports::{KeyValueStore, load_json};

/// Reads a stored document, starting from the default when the key is
/// missing or its contents cannot be read.
async fn load_or_default<T: DeserializeOwned + Default>(storage: &dyn KeyValueStore, key: &str) -> T {
    match load_json(storage, key).await {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable stored state");
            T::default()
        }
    }
}
