//! Error types for searchio
//!
//! Provides standardized error handling across the library. Validation and
//! not-found errors are meant to reach the user; corrupt records never leave
//! the repository.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in searchio
#[derive(Debug, Error)]
pub enum SearchioError {
    /// A search definition failed validation (bad URL, missing title, ...)
    #[error("Invalid search: {0}")]
    Validation(String),

    /// The search to delete does not exist
    #[error("Search '{0}' not found")]
    NotFound(String),

    /// A persisted search file could not be parsed
    #[error("Corrupt search file {path}: {message}")]
    CorruptRecord { path: PathBuf, message: String },

    /// Settings store errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workflow document (property list) errors
    #[error("Workflow document error: {0}")]
    Document(#[from] plist::Error),

    /// JSON errors from records or settings
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SearchioError {
    /// Whether this error is a user-facing outcome rather than a failure of
    /// the tool itself.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchioError::NotFound(_))
    }
}

/// Result type alias for searchio operations
pub type SearchioResult<T> = Result<T, SearchioError>;
