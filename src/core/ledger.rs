//! Suppressed default searches.
//!
//! Default searches are compiled in, so deleting one only records its uid
//! here. The ledger is a single comma-joined value in the settings store.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::info;

use crate::error::SearchioResult;
use crate::services::settings::SettingsStore;

/// Settings key holding the suppressed uids.
pub const LEDGER_KEY: &str = "deleted_defaults";

/// Set of default uids the user has deleted.
pub struct DeletionLedger<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> DeletionLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All suppressed uids.
    pub fn suppressed(&self) -> SearchioResult<BTreeSet<String>> {
        let raw = match self.store.get(LEDGER_KEY)? {
            Some(Value::String(s)) => s,
            _ => return Ok(BTreeSet::new()),
        };

        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn is_suppressed(&self, uid: &str) -> SearchioResult<bool> {
        Ok(self.suppressed()?.contains(uid))
    }

    /// Suppress `uid`. Returns `false` if it already was.
    pub fn suppress(&mut self, uid: &str) -> SearchioResult<bool> {
        let mut uids = self.suppressed()?;
        if !uids.insert(uid.to_string()) {
            return Ok(false);
        }

        let joined = uids.into_iter().collect::<Vec<_>>().join(",");
        self.store.set(LEDGER_KEY, Value::String(joined))?;
        info!(uid = %uid, "Suppressed default search");
        Ok(true)
    }

    /// The underlying settings store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
