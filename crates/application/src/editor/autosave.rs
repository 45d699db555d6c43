//! Debounced background save of the editor contents

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use flowdeck_domain::AutoSaveSnapshot;
use flowdeck_domain::suite::EditorMode;
use tokio::task::JoinHandle;

use crate::error::ApplicationResult;
use crate::ports::{Clock, KeyValueStore, keys, load_json, save_json};

/// Writes at most one snapshot per quiet period.
///
/// Every [`schedule`](Self::schedule) cancels the pending write and starts a
/// new one `delay` later, so a burst of edits produces a single write.
pub struct AutoSaveScheduler {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    delay: Duration,
    max_age: chrono::Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaveScheduler {
    /// Creates a scheduler writing under the auto-save key.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        delay: Duration,
        max_age: chrono::Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            delay,
            max_age,
            pending: Mutex::new(None),
        }
    }

    /// Replaces the pending write with one of the given contents.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, mode: EditorMode, yaml_content: String, test_suite_name: String) {
        let snapshot = AutoSaveSnapshot {
            mode,
            yaml_content,
            timestamp: self.clock.now(),
            test_suite_name,
        };
        let storage = Arc::clone(&self.storage);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = save_json(storage.as_ref(), keys::TEST_SUITE_AUTOSAVE, &snapshot).await {
                tracing::warn!(error = %e, "auto-save failed");
            } else {
                tracing::debug!(mode = %snapshot.mode, "auto-saved test suite");
            }
        });

        if let Some(previous) = self.lock_pending().replace(task) {
            previous.abort();
        }
    }

    /// Returns true while a write is waiting for its delay to elapse.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock_pending().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Returns the stored snapshot if it is younger than the max age.
    ///
    /// Expired or unreadable snapshots are deleted.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or cleaned.
    pub async fn restore(&self) -> ApplicationResult<Option<AutoSaveSnapshot>> {
        let snapshot = match load_json::<AutoSaveSnapshot>(self.storage.as_ref(), keys::TEST_SUITE_AUTOSAVE).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable auto-save");
                self.storage.remove(keys::TEST_SUITE_AUTOSAVE).await?;
                return Ok(None);
            }
        };

        match snapshot {
            Some(s) if s.is_expired(self.clock.now(), self.max_age) => {
                tracing::info!(saved_at = %s.timestamp, "discarding expired auto-save");
                self.storage.remove(keys::TEST_SUITE_AUTOSAVE).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Cancels any pending write and deletes the stored snapshot.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be deleted.
    pub async fn clear(&self) -> ApplicationResult<()> {
        if let Some(task) = self.lock_pending().take() {
            task.abort();
        }
        self.storage.remove(keys::TEST_SUITE_AUTOSAVE).await?;
        Ok(())
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.lock_pending().take() {
            task.abort();
        }
    }
}
