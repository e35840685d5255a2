//! searchio - search-engine keywords for the Alfred launcher.
//!
//! Keeps a collection of search definitions (built-in defaults plus the
//! user's own) and turns it into script-filter nodes inside the workflow's
//! `info.plist`, one node per keyword.
//!
//! # Architecture
//!
//! - [`config`] - Configuration loading and management
//! - [`core`] - Records, the deletion ledger, merging and regeneration
//! - [`services`] - Files on disk: settings, the workflow document, icons
//! - [`workflow`] - The add, delete and reload operations
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use searchio::{Config, Workflow};
//!
//! let config = Config::load();
//! let workflow = Workflow::open(&config);
//! workflow.reload(false)?;
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod services;
pub mod workflow;

mod error;

pub use config::Config;
pub use core::record::{NewSearch, SearchRecord};
pub use error::{SearchioError, SearchioResult};
pub use workflow::{SyncReport, Workflow};
