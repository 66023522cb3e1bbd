//! # Settings Module
//!
//! Front-end state remembered between runs: the last scanned root and the
//! last report path. The engine never reads these.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// File name of the settings dotfile in the home directory
pub const SETTINGS_FILE_NAME: &str = ".dupe-finder.json";

/// Remembered front-end state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the most recent scan
    #[serde(default)]
    pub last_root: Option<PathBuf>,
    /// Report path of the most recent scan
    #[serde(default)]
    pub last_output: Option<PathBuf>,
}

/// Storage for [`Settings`]
pub trait SettingsStore: Send + Sync {
    /// Load settings, falling back to defaults when nothing was saved yet
    fn load(&self) -> Result<Settings, SettingsError>;

    /// Replace the stored settings
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings kept as pretty printed JSON in a single file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `~/.dupe-finder.json`
    pub fn default_location() -> Result<Self, SettingsError> {
        let home = dirs::home_dir().ok_or(SettingsError::NoHomeDirectory)?;
        Ok(Self::new(home.join(SETTINGS_FILE_NAME)))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let content = serde_json::to_string_pretty(settings).map_err(|e| {
            SettingsError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

/// Settings held in memory, for tests and embedding hosts
#[derive(Default)]
pub struct InMemoryStore {
    settings: RwLock<Settings>,
}

impl InMemoryStore {
    /// Create a store holding default settings
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemoryStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self
            .settings
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut stored = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stored = settings.clone();
        Ok(())
    }
}
