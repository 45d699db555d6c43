//! Persisted request history

use std::sync::Arc;

use flowdeck_domain::{HistoryEntry, RequestHistory};

use super::load_or_default;
use crate::error::ApplicationResult;
use crate::ports::{KeyValueStore, keys, save_json};

/// Request history, newest first, capped and written through on every change.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    history: RequestHistory,
}

impl HistoryStore {
    /// Loads stored history, applying `limit` to what was on disk.
    ///
    /// Missing or unreadable history yields an empty store.
    pub async fn load(storage: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        let entries: Vec<HistoryEntry> = load_or_default(storage.as_ref(), keys::REQUEST_HISTORY).await;

        let mut history = RequestHistory::new(limit);
        // Stored newest first; add() pushes to the front.
        for entry in entries.into_iter().rev() {
            history.add(entry);
        }
        Self { storage, history }
    }

    /// The wrapped history.
    #[must_use]
    pub const fn history(&self) -> &RequestHistory {
        &self.history
    }

    /// Entries newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.entries().iter()
    }

    /// Records an entry.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn record(&mut self, entry: HistoryEntry) -> ApplicationResult<()> {
        let previous = self.history.clone();
        self.history.add(entry);
        self.commit(previous).await
    }

    /// Removes one entry. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn remove(&mut self, id: &str) -> ApplicationResult<bool> {
        let previous = self.history.clone();
        let removed = self.history.remove(id).is_some();
        if removed {
            self.commit(previous).await?;
        }
        Ok(removed)
    }

    /// Drops every entry.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn clear(&mut self) -> ApplicationResult<()> {
        let previous = self.history.clone();
        self.history.clear();
        self.commit(previous).await
    }

    async fn commit(&mut self, previous: RequestHistory) -> ApplicationResult<()> {
        if let Err(e) = save_json(self.storage.as_ref(), keys::REQUEST_HISTORY, self.history.entries()).await {
            self.history = previous;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, MemoryStore};
    use crate::ports::Clock;
    use flowdeck_domain::{ApiRequest, ApiResponse, HttpMethod};
    use pretty_assertions::assert_eq;

    fn entry(name: &str) -> HistoryEntry {
        let request = ApiRequest::with_url(name, HttpMethod::Get, "https://api.test");
        let response = ApiResponse::new(200, Vec::new(), b"{}", 12);
        HistoryEntry::succeeded(request, response, FixedClock::at(2026, 3, 1).now())
    }

    #[tokio::test]
    async fn test_history_survives_reload_in_order() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = HistoryStore::load(storage.clone(), 100).await;
        store.record(entry("first")).await.expect("record");
        store.record(entry("second")).await.expect("record");

        let reloaded = HistoryStore::load(storage, 100).await;
        let names: Vec<&str> = reloaded.entries().map(|e| e.request.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_history_cap_applies_when_loading() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = HistoryStore::load(storage.clone(), 100).await;
        for i in 0..5 {
            store.record(entry(&format!("r{i}"))).await.expect("record");
        }

        let reloaded = HistoryStore::load(storage, 3).await;
        let names: Vec<&str> = reloaded.entries().map(|e| e.request.name.as_str()).collect();
        assert_eq!(names, vec!["r4", "r3", "r2"]);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = HistoryStore::load(storage.clone(), 100).await;
        store.record(entry("only")).await.expect("record");
        store.clear().await.expect("clear");

        assert!(store.history().is_empty());
        assert_eq!(storage.snapshot(keys::REQUEST_HISTORY), Some(serde_json::json!([])));
    }

    #[tokio::test]
    async fn test_unreadable_history_starts_empty() {
        let storage = Arc::new(MemoryStore::default());
        storage.seed(keys::REQUEST_HISTORY, serde_json::json!({"not": "a list"}));

        let mut store = HistoryStore::load(storage.clone(), 100).await;
        assert!(store.history().is_empty());

        store.record(entry("fresh")).await.expect("record");
        let reloaded = HistoryStore::load(storage, 100).await;
        assert_eq!(reloaded.entries().count(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_entries() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = HistoryStore::load(storage.clone(), 100).await;
        store.record(entry("kept")).await.expect("record");

        storage.fail_writes();
        assert!(store.record(entry("lost")).await.is_err());
        assert!(store.clear().await.is_err());

        let names: Vec<&str> = store.entries().map(|e| e.request.name.as_str()).collect();
        assert_eq!(names, vec!["kept"]);
    }
}
