use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::SearchioResult;

/// Environment variable the launcher sets to the workflow's data directory.
pub const DATA_DIR_ENV: &str = "alfred_workflow_data";

/// Environment variable overriding the workflow directory.
pub const WORKFLOW_DIR_ENV: &str = "SEARCHIO_WORKFLOW_DIR";

/// Uid of the "Open URL" action every generated script filter connects to.
pub const OPEN_URL_UID: &str = "1133DEAA-5A8F-4E7D-9E9C-A76CB82D9F92";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub layout: LayoutConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory containing the workflow document and icons.
    pub workflow_dir: String,
    /// Directory holding saved searches and settings.
    pub data_dir: String,
}

/// Canvas position of generated script filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X position of every generated node.
    pub x: i64,
    /// Y position of the first generated node.
    pub y: i64,
    /// Vertical distance between generated nodes.
    pub step: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Document file name inside the workflow directory.
    pub document: String,
    /// Node generated script filters connect to.
    pub sink_uid: String,
    /// Program the script filters run, followed by the search uid and query.
    pub search_command: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".local").join("share"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("searchio");

        Self {
            workflow_dir: ".".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x: 270,
            y: 220,
            step: 170,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            document: "info.plist".to_string(),
            sink_uid: OPEN_URL_UID.to_string(),
            search_command: "./search".to_string(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("searchio")
            .join("config.toml")
    }

    /// Load config from the default path, or return defaults if it is
    /// missing or broken. Environment overrides are applied either way.
    pub fn load() -> Self {
        let path = Self::config_path();

        let mut config = if path.exists() {
            match Self::read(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate();
        config
    }

    /// Load config from an explicit path. Errors are returned, not swallowed.
    pub fn load_from(path: &Path) -> SearchioResult<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate();
        Ok(config)
    }

    fn read(path: &Path) -> SearchioResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply launcher-provided directories.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.paths.data_dir = dir;
        }
        if let Some(dir) = lookup(WORKFLOW_DIR_ENV).filter(|d| !d.is_empty()) {
            self.paths.workflow_dir = dir;
        }
    }

    /// Validate and clamp config values to acceptable ranges
    fn validate(&mut self) {
        if self.layout.step < 1 {
            warn!(step = self.layout.step, "layout.step must be positive, using default");
            self.layout.step = LayoutConfig::default().step;
        }

        if self.workflow.document.trim().is_empty() {
            warn!("workflow.document is empty, using default");
            self.workflow.document = WorkflowConfig::default().document;
        }
    }

    /// Workflow directory with `~` expanded.
    pub fn workflow_dir(&self) -> PathBuf {
        expand(&self.paths.workflow_dir)
    }

    /// Data directory with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        expand(&self.paths.data_dir)
    }

    /// Directory of saved searches.
    pub fn searches_dir(&self) -> PathBuf {
        self.data_dir().join("searches")
    }

    /// Settings file holding the deletion ledger.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }

    /// Path of the workflow document.
    pub fn document_path(&self) -> PathBuf {
        self.workflow_dir().join(&self.workflow.document)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
