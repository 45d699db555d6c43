//! User settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux: ~/.config/flowdeck/settings.json
//! - macOS: ~/Library/Application Support/flowdeck/settings.json
//! - Windows: %APPDATA%/flowdeck/settings.json
//!
//! `FLOWDECK_DATA_DIR`, `FLOWDECK_ENGINE_PROGRAM` and
//! `FLOWDECK_ENGINE_PACKAGE` override the stored values.

use std::path::PathBuf;

use flowdeck_domain::AppSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides the storage root.
pub const ENV_DATA_DIR: &str = "FLOWDECK_DATA_DIR";
/// Overrides the engine launcher program.
pub const ENV_ENGINE_PROGRAM: &str = "FLOWDECK_ENGINE_PROGRAM";
/// Overrides the engine package.
pub const ENV_ENGINE_PACKAGE: &str = "FLOWDECK_ENGINE_PACKAGE";

const APP_DIR: &str = "flowdeck";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for user settings persistence.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Uses the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|p| p.join(APP_DIR).join("settings.json")),
        }
    }

    /// Uses an explicit settings file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn settings_path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Loads settings from disk, then applies environment overrides.
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<AppSettings, SettingsError> {
        let stored = self.load_file().await?;
        Ok(apply_overrides(stored, |name| std::env::var(name).ok()))
    }

    async fn load_file(&self) -> Result<AppSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(AppSettings::default());
        };

        match fs::read(path).await {
            Ok(content) => Ok(from_json_bytes(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    /// Returns an error if there is no config directory or the file cannot
    /// be written.
    pub async fn save(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, to_json_stable_bytes(settings)?).await?;
        Ok(())
    }
}

/// Applies `FLOWDECK_*` overrides read through `lookup`. Blank values are ignored.
pub fn apply_overrides(mut settings: AppSettings, lookup: impl Fn(&str) -> Option<String>) -> AppSettings {
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(dir) = lookup(ENV_DATA_DIR) {
        settings.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(program) = lookup(ENV_ENGINE_PROGRAM) {
        settings.engine_program = program;
    }
    if let Some(package) = lookup(ENV_ENGINE_PACKAGE) {
        settings.engine_package = package;
    }
    settings
}

/// Directory holding the key/value store files.
///
/// The configured `data_dir`, else the platform data directory, else
/// `.flowdeck` in the working directory.
#[must_use]
pub fn resolve_data_dir(settings: &AppSettings) -> PathBuf {
    settings
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|p| p.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from(".flowdeck"))
}
