//! Clock port

use chrono::{DateTime, Utc};

/// Source of the timestamps stamped on workspaces, history entries and
/// auto-save snapshots.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
