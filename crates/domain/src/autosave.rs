//! Editor auto-save snapshot

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::suite::EditorMode;

/// The editor contents saved in the background so an unsaved suite
/// survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveSnapshot {
    /// Mode the editor was in.
    pub mode: EditorMode,
    /// Document as YAML.
    pub yaml_content: String,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Suite name, for the restore prompt.
    #[serde(default)]
    pub test_suite_name: String,
}

impl AutoSaveSnapshot {
    /// Returns true once the snapshot is older than `max_age`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now.signed_duration_since(self.timestamp) > max_age
    }
}
