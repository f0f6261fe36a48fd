//! Local persisted state.
//!
//! A flat string key/value map stored as one JSON file. Values are opaque
//! strings; structured values (like [`AgentSettings`]) are JSON encoded
//! into them. There is no schema versioning.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::models::{AgentSettings, AGENT_SETTINGS_KEY};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// JSON-file key/value store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry. A missing file is an empty store.
    pub fn entries(&self) -> StorageResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> StorageResult<()> {
        let mut entries = self.entries_or_empty();
        entries.insert(key.to_string(), value.into());
        self.write(&entries)
    }

    /// Returns whether the key existed.
    pub fn remove(&self, key: &str) -> StorageResult<bool> {
        let mut entries = self.entries_or_empty();
        let existed = entries.remove(key).is_some();
        if existed {
            self.write(&entries)?;
        }
        Ok(existed)
    }

    /// Persisted agent settings, or defaults when absent or unreadable.
    pub fn load_settings(&self) -> AgentSettings {
        let raw = match self.get(AGENT_SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AgentSettings::default(),
            Err(e) => {
                warn!(error = %e, "could not read local storage, using default settings");
                return AgentSettings::default();
            }
        };

        match serde_json::from_str::<AgentSettings>(&raw) {
            Ok(settings) if settings.validate().is_ok() => settings,
            Ok(_) => {
                warn!("stored agent settings are out of range, using defaults");
                AgentSettings::default()
            }
            Err(e) => {
                warn!(error = %e, "stored agent settings are corrupt, using defaults");
                AgentSettings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &AgentSettings) -> StorageResult<()> {
        settings
            .validate()
            .map_err(|e| StorageError::InvalidSettings(e.to_string()))?;
        let encoded = serde_json::to_string(settings)?;
        self.set(AGENT_SETTINGS_KEY, encoded)?;
        debug!(path = %self.path.display(), "agent settings saved");
        Ok(())
    }

    pub fn reset_settings(&self) -> StorageResult<()> {
        self.remove(AGENT_SETTINGS_KEY).map(|_| ())
    }

    /// A corrupt file is replaced rather than blocking every write.
    fn entries_or_empty(&self) -> BTreeMap<String, String> {
        self.entries().unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable local storage");
            BTreeMap::new()
        })
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}
