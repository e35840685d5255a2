//! Core logic, independent of the launcher's file formats.
//!
//! - [`record`] - search definitions and their validation
//! - [`defaults`] - built-in searches
//! - [`ledger`] - deleted default searches
//! - [`repository`] - merged view of defaults and saved searches
//! - [`regenerate`] - script-filter generation

pub mod defaults;
pub mod ledger;
pub mod record;
pub mod regenerate;
pub mod repository;

pub use ledger::DeletionLedger;
pub use record::{NewSearch, Origin, SearchRecord};
pub use regenerate::{RegenerationReport, Regenerator};
pub use repository::{by_title, RecordOrder, Repository};
