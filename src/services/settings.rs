//! Workflow settings storage.
//!
//! Provides the key-value settings port used by the deletion ledger. The
//! workflow keeps its settings in a JSON object (`settings.json` in the data
//! directory); tests use the in-memory store. The settings file holds the
//! deletion ledger, so a broken file is reported rather than replaced.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::persist::write_atomic;
use crate::error::{SearchioError, SearchioResult};

/// Key-value settings port.
pub trait SettingsStore {
    /// Get a value from storage.
    fn get(&self, key: &str) -> SearchioResult<Option<Value>>;

    /// Set a value in storage. Persistent stores write through immediately.
    fn set(&mut self, key: &str, value: Value) -> SearchioResult<()>;
}

/// Settings backed by a JSON file.
///
/// Data is cached in memory and written to disk on modification.
pub struct JsonSettings {
    /// Path to the settings file.
    path: PathBuf,
    /// In-memory cache of stored values.
    cache: HashMap<String, Value>,
}

impl JsonSettings {
    /// Open the settings file at `path`.
    ///
    /// A missing file is an empty store. A file that cannot be read or
    /// parsed is an error, so it is never overwritten with partial data.
    pub fn open(path: impl Into<PathBuf>) -> SearchioResult<Self> {
        let path = path.into();

        let cache: HashMap<String, Value> = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                SearchioError::Settings(format!(
                    "Failed to read settings from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                SearchioError::Settings(format!(
                    "Malformed settings file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), keys = cache.len(), "Opened settings");
        Ok(Self { path, cache })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> SearchioResult<()> {
        // Sorted output keeps the file diff-friendly
        let sorted: serde_json::Map<String, Value> = self
            .cache
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let contents = serde_json::to_string_pretty(&sorted)?;

        write_atomic(&self.path, contents.as_bytes()).map_err(|e| {
            SearchioError::Settings(format!(
                "Failed to write settings to {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, key: &str) -> SearchioResult<Option<Value>> {
        Ok(self.cache.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> SearchioResult<()> {
        self.cache.insert(key.to_string(), value);
        self.flush()
    }
}

/// Settings held only in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> SearchioResult<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> SearchioResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
