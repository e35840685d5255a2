//! Search repository.
//!
//! Merges the compiled-in default searches with the user's saved searches
//! (one JSON file per search) and the deletion ledger into a single
//! collection in which every uid appears once:
//!
//! 1. defaults whose uid is suppressed are dropped
//! 2. user files replace defaults with the same uid, whole
//! 3. suppressed uids are excluded even when a user file carries them
//!
//! Corrupt user files are deleted with a warning instead of failing the load.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::defaults::default_searches;
use super::ledger::DeletionLedger;
use super::record::{is_valid_uid, SearchRecord};
use crate::error::{SearchioError, SearchioResult};
use crate::services::persist::write_atomic;
use crate::services::settings::SettingsStore;

/// File extension of saved searches.
pub const RECORD_EXTENSION: &str = "json";

/// Ordering applied to merged collections and generated nodes.
pub type RecordOrder = fn(&SearchRecord, &SearchRecord) -> Ordering;

/// Case-sensitive title order, uid as tie-breaker.
pub fn by_title(a: &SearchRecord, b: &SearchRecord) -> Ordering {
    a.title.cmp(&b.title).then_with(|| a.uid.cmp(&b.uid))
}

pub struct Repository {
    dir: PathBuf,
    defaults: Vec<SearchRecord>,
    order: RecordOrder,
}

impl Repository {
    /// Repository over `dir` with the built-in defaults.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_defaults(dir, default_searches())
    }

    /// Repository over `dir` with an explicit default set.
    pub fn with_defaults(dir: impl Into<PathBuf>, defaults: Vec<SearchRecord>) -> Self {
        Self {
            dir: dir.into(),
            defaults,
            order: by_title,
        }
    }

    /// Replace the collection ordering.
    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn defaults(&self) -> &[SearchRecord] {
        &self.defaults
    }

    pub fn order(&self) -> RecordOrder {
        self.order
    }

    pub fn is_default(&self, uid: &str) -> bool {
        self.defaults.iter().any(|d| d.uid == uid)
    }

    /// Path of the store file for `uid`.
    pub fn record_path(&self, uid: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", uid, RECORD_EXTENSION))
    }

    /// Sort `records` with the repository ordering.
    pub fn sort(&self, records: &mut [SearchRecord]) {
        records.sort_by(self.order);
    }

    /// Load every saved search, deleting corrupt files.
    ///
    /// Files are visited in name order so the result is deterministic.
    pub fn load_user_records(&self) -> SearchioResult<Vec<SearchRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|ext| ext == RECORD_EXTENSION))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_record(&path) {
                Ok(record) => records.push(record),
                Err(SearchioError::CorruptRecord { path, message }) => {
                    warn!(path = %path.display(), error = %message, "Removing corrupt search file");
                    if let Err(e) = fs::remove_file(&path) {
                        warn!(path = %path.display(), error = %e, "Failed to remove corrupt search file");
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable search file");
                }
            }
        }

        debug!(count = records.len(), dir = %self.dir.display(), "Loaded user searches");
        Ok(records)
    }

    fn load_record(path: &Path) -> SearchioResult<SearchRecord> {
        let uid = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let corrupt = |message: String| SearchioError::CorruptRecord {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path)?;
        let contents = String::from_utf8(bytes).map_err(|e| corrupt(e.to_string()))?;
        if contents.trim().is_empty() {
            return Err(corrupt("empty file".to_string()));
        }

        SearchRecord::from_json(&uid, &contents).map_err(|e| corrupt(e.to_string()))
    }

    /// Merged collection in source order: surviving defaults first, then
    /// user searches in file-name order.
    pub fn unsorted<S: SettingsStore>(
        &self,
        ledger: &DeletionLedger<S>,
    ) -> SearchioResult<Vec<SearchRecord>> {
        let suppressed = ledger.suppressed()?;
        let users = self.load_user_records()?;
        let user_uids: HashSet<&str> = users.iter().map(|r| r.uid.as_str()).collect();

        let mut merged: Vec<SearchRecord> = self
            .defaults
            .iter()
            .filter(|d| !suppressed.contains(&d.uid))
            .filter(|d| !user_uids.contains(d.uid.as_str()))
            .cloned()
            .collect();

        for record in users {
            if suppressed.contains(&record.uid) {
                debug!(uid = %record.uid, "Ignoring user search for suppressed default");
                continue;
            }
            merged.push(record);
        }

        Ok(merged)
    }

    /// Merged collection sorted with the repository ordering.
    pub fn merged<S: SettingsStore>(
        &self,
        ledger: &DeletionLedger<S>,
    ) -> SearchioResult<Vec<SearchRecord>> {
        let mut merged = self.unsorted(ledger)?;
        self.sort(&mut merged);
        Ok(merged)
    }

    /// Find a search in the merged collection.
    pub fn find<S: SettingsStore>(
        &self,
        ledger: &DeletionLedger<S>,
        uid: &str,
    ) -> SearchioResult<Option<SearchRecord>> {
        Ok(self.unsorted(ledger)?.into_iter().find(|r| r.uid == uid))
    }

    /// Validate and write a search to the store.
    pub fn save(&self, record: &SearchRecord) -> SearchioResult<PathBuf> {
        record.validate()?;

        let path = self.record_path(&record.uid);
        write_atomic(&path, record.to_json()?.as_bytes())?;
        info!(uid = %record.uid, title = %record.title, "Saved search");
        Ok(path)
    }

    /// Delete the store file for `uid`. Returns `false` if there was none
    /// or `uid` is not a valid search uid.
    pub fn remove(&self, uid: &str) -> SearchioResult<bool> {
        if !is_valid_uid(uid) {
            return Ok(false);
        }

        let path = self.record_path(uid);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        info!(uid = %uid, path = %path.display(), "Removed search file");
        Ok(true)
    }
}
