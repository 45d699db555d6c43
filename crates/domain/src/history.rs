//! Request History Domain Model
//!
//! Defines the structure for tracking executed requests.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::ApiRequest;
use crate::response::ApiResponse;

/// Default number of entries kept in history.
pub const HISTORY_LIMIT: usize = 100;

/// A single entry in the request history. Entries are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// When the request was sent.
    pub timestamp: DateTime<Utc>,
    /// The request as sent, with variables resolved.
    pub request: ApiRequest,
    /// The response, if one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiResponse>,
    /// Transport error, if the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

impl HistoryEntry {
    /// Creates an entry for a request that got a response.
    #[must_use]
    pub fn succeeded(request: ApiRequest, response: ApiResponse, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: crate::generate_id(),
            timestamp,
            request,
            duration_ms: response.duration_ms,
            response: Some(response),
            error: None,
        }
    }

    /// Creates an entry for a request that failed before a response arrived.
    #[must_use]
    pub fn failed(
        request: ApiRequest,
        error: impl Into<String>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: crate::generate_id(),
            timestamp,
            request,
            response: None,
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Returns the response status, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// Returns a human-readable "time ago" string relative to `now`.
    #[must_use]
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let duration = now.signed_duration_since(self.timestamp);

        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d ago", duration.num_days())
        } else {
            self.timestamp.format("%Y-%m-%d").to_string()
        }
    }
}

/// Request history with a maximum size limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestHistory {
    /// History entries (newest first).
    entries: VecDeque<HistoryEntry>,
    /// Maximum number of entries to keep.
    #[serde(default = "default_max_entries")]
    max_entries: usize,
}

const fn default_max_entries() -> usize {
    HISTORY_LIMIT
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl RequestHistory {
    /// Creates a new empty history.
    #[must_use]
    pub const fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Adds an entry at the front, evicting the oldest past the limit.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.max_entries);
    }

    /// Returns all entries (newest first).
    #[must_use]
    pub const fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    /// Returns an entry by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Removes an entry by ID.
    pub fn remove(&mut self, id: &str) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    /// Clears all history entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured limit.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Sets the maximum number of entries and trims if needed.
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        self.entries.truncate(max);
    }
}
