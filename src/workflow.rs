//! Add, delete and reload.
//!
//! Every operation ends the same way: the full merged collection is
//! regenerated into the workflow document, the document is replaced
//! atomically, then icon symlinks are reconciled.

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::core::ledger::DeletionLedger;
use crate::core::record::{is_valid_uid, SearchRecord};
use crate::core::regenerate::{RegenerationReport, Regenerator};
use crate::core::repository::Repository;
use crate::error::{SearchioError, SearchioResult};
use crate::services::document::WorkflowDocument;
use crate::services::icons::{self, IconReport};
use crate::services::settings::{JsonSettings, SettingsStore};

/// Result of rewriting the workflow document.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub regeneration: RegenerationReport,
    pub icons: IconReport,
}

/// The searchio workflow: saved searches, the deletion ledger and the
/// generated document.
pub struct Workflow<S: SettingsStore> {
    repository: Repository,
    ledger: DeletionLedger<S>,
    regenerator: Regenerator,
    document_path: PathBuf,
    workflow_dir: PathBuf,
}

impl Workflow<JsonSettings> {
    /// Open the workflow described by `config`, with settings on disk.
    pub fn open(config: &Config) -> SearchioResult<Self> {
        let store = JsonSettings::open(config.settings_path())?;
        Ok(Self::with_store(config, store))
    }
}

impl<S: SettingsStore> Workflow<S> {
    /// Open the workflow with an explicit settings store.
    pub fn with_store(config: &Config, store: S) -> Self {
        Self {
            repository: Repository::new(config.searches_dir()),
            ledger: DeletionLedger::new(store),
            regenerator: Regenerator::from_config(config),
            document_path: config.document_path(),
            workflow_dir: config.workflow_dir(),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn ledger(&self) -> &DeletionLedger<S> {
        &self.ledger
    }

    /// All searches, sorted.
    pub fn searches(&self) -> SearchioResult<Vec<SearchRecord>> {
        self.repository.merged(&self.ledger)
    }

    /// Look up one search by uid.
    pub fn find(&self, uid: &str) -> SearchioResult<Option<SearchRecord>> {
        self.repository.find(&self.ledger, uid)
    }

    /// Save `record` and regenerate the workflow.
    ///
    /// Nothing is written if the record is invalid or its uid belongs to a
    /// deleted default.
    pub fn add(&mut self, record: SearchRecord) -> SearchioResult<SyncReport> {
        record.validate()?;

        if self.ledger.is_suppressed(&record.uid)? {
            return Err(SearchioError::Validation(format!(
                "'{}' is a deleted default search and cannot be added again",
                record.uid
            )));
        }

        self.repository.save(&record)?;
        info!(uid = %record.uid, keyword = %record.keyword, "Added search");

        let records = self.searches()?;
        self.sync(&records)
    }

    /// Delete a search and regenerate the workflow.
    ///
    /// Defaults are suppressed in the ledger, user searches lose their file.
    /// Returns [`SearchioError::NotFound`] if there was nothing to delete.
    pub fn delete(&mut self, uid: &str) -> SearchioResult<SyncReport> {
        // Anything else could name a file outside the search store
        if !is_valid_uid(uid) {
            return Err(SearchioError::NotFound(uid.to_string()));
        }

        let deleted = if self.repository.is_default(uid) {
            let suppressed = self.ledger.suppress(uid)?;
            // A stale user file would shadow the default if it came back
            let removed = self.repository.remove(uid)?;
            suppressed || removed
        } else {
            self.repository.remove(uid)?
        };

        if !deleted {
            return Err(SearchioError::NotFound(uid.to_string()));
        }
        info!(uid = %uid, "Deleted search");

        let records = self.searches()?;
        self.sync(&records)
    }

    /// Regenerate the workflow from all searches, or from the built-in
    /// defaults alone. Deleted defaults stay deleted either way.
    pub fn reload(&self, defaults_only: bool) -> SearchioResult<SyncReport> {
        let records = if defaults_only {
            let suppressed = self.ledger.suppressed()?;
            let defaults: Vec<SearchRecord> = self
                .repository
                .defaults()
                .iter()
                .filter(|d| !suppressed.contains(&d.uid))
                .cloned()
                .collect();
            for record in &defaults {
                record.validate()?;
            }
            defaults
        } else {
            self.searches()?
        };

        self.sync(&records)
    }

    fn sync(&self, records: &[SearchRecord]) -> SearchioResult<SyncReport> {
        let mut doc = WorkflowDocument::load(&self.document_path)?;
        let regeneration = self.regenerator.regenerate(&mut doc, records, None);
        doc.save(&self.document_path)?;

        let icons = icons::reconcile(&self.workflow_dir, &regeneration.targets)?;

        info!(
            removed = regeneration.removed.len(),
            emitted = regeneration.emitted.len(),
            path = %self.document_path.display(),
            "Updated workflow"
        );
        Ok(SyncReport {
            regeneration,
            icons,
        })
    }
}
