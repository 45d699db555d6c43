//! Application Settings Domain Model
//!
//! Tunables of the API client and the test engine launcher.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application settings.
///
/// Every field has a default, so a partial `settings.json` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Program that launches the engine.
    #[serde(default = "default_engine_program")]
    pub engine_program: String,

    /// Package name passed to `engine_program`; empty to run the program directly.
    #[serde(default = "default_engine_package")]
    pub engine_package: String,

    /// Maximum number of history entries to keep.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Debounce delay of the editor auto-save.
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Age after which an auto-save snapshot is discarded.
    #[serde(default = "default_autosave_max_age_days")]
    pub autosave_max_age_days: u32,

    /// Timeout for requests sent from the request editor.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether the request editor follows redirects.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Storage root; the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_engine_program() -> String {
    "npx".to_string()
}

fn default_engine_package() -> String {
    "flow-test-engine".to_string()
}

const fn default_history_limit() -> usize {
    crate::history::HISTORY_LIMIT
}

const fn default_autosave_delay_ms() -> u64 {
    1000
}

const fn default_autosave_max_age_days() -> u32 {
    7
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

const fn default_follow_redirects() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            engine_program: default_engine_program(),
            engine_package: default_engine_package(),
            history_limit: default_history_limit(),
            autosave_delay_ms: default_autosave_delay_ms(),
            autosave_max_age_days: default_autosave_max_age_days(),
            request_timeout_ms: default_request_timeout_ms(),
            follow_redirects: default_follow_redirects(),
            data_dir: None,
        }
    }
}

impl AppSettings {
    /// Auto-save debounce delay.
    #[must_use]
    pub const fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Maximum age of an auto-save snapshot.
    #[must_use]
    pub fn autosave_max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.autosave_max_age_days))
    }

    /// Request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.engine_program, "npx");
        assert_eq!(settings.engine_package, "flow-test-engine");
        assert_eq!(settings.history_limit, 100);
        assert_eq!(settings.autosave_delay(), Duration::from_secs(1));
        assert_eq!(settings.autosave_max_age(), chrono::Duration::days(7));
        assert!(settings.follow_redirects);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"history_limit": 20}"#).expect("decode");
        assert_eq!(settings.history_limit, 20);
        assert_eq!(settings.request_timeout_ms, 30_000);
    }
}
