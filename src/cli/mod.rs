//! CLI commands for searchio.
//!
//! Manage saved searches and regenerate the workflow: add, delete, reload,
//! list, url.

pub mod add;
pub mod list;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use crate::config::Config;
use crate::error::SearchioError;
use crate::workflow::{SyncReport, Workflow};

#[derive(Parser)]
#[command(name = "searchio")]
#[command(about = "Search-engine keywords for the Alfred launcher", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/searchio/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a new search, or replace one with the same uid
    Add(add::AddArgs),

    /// Delete a search (defaults are hidden, not removed)
    Delete {
        /// Uid of the search
        uid: String,
    },

    /// Regenerate the workflow's script filters
    Reload {
        /// Only write the built-in searches
        #[arg(long)]
        defaults: bool,
    },

    /// List searches, optionally narrowed by a query
    List(list::ListArgs),

    /// Print the URL a search opens for a query
    Url {
        /// Uid of the search
        uid: String,

        /// Query to search for
        query: String,

        /// Print the suggestion URL instead
        #[arg(long)]
        suggest: bool,
    },
}

/// Load config from `--config` if given, otherwise the default location.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

/// Parse arguments and run the requested command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Add(args) => add::run_add(&config, args),
        Commands::Delete { uid } => run_delete(&config, &uid),
        Commands::Reload { defaults } => run_reload(&config, defaults),
        Commands::List(args) => list::run_list(&config, &args),
        Commands::Url {
            uid,
            query,
            suggest,
        } => run_url(&config, &uid, &query, suggest),
    }
}

/// Print a one-line summary of a document rewrite.
pub(crate) fn print_sync(report: &SyncReport) {
    let regen = &report.regeneration;
    println!(
        "{} {} {}",
        style("✓").green().bold(),
        style(format!("Wrote {} script filter(s)", regen.emitted.len())).cyan(),
        style(format!(
            "(removed {}, {} icon link(s))",
            regen.removed.len(),
            report.icons.linked.len()
        ))
        .dim()
    );

    if !regen.skipped.is_empty() {
        println!(
            "{} Skipped: {}",
            style("!").yellow().bold(),
            regen.skipped.join(", ")
        );
    }
}

fn run_delete(config: &Config, uid: &str) -> anyhow::Result<()> {
    let mut workflow = Workflow::open(config)?;

    match workflow.delete(uid) {
        Ok(report) => {
            println!("{} Search deleted: {}", style("✓").green().bold(), style(uid).bold());
            print_sync(&report);
            Ok(())
        }
        Err(SearchioError::NotFound(_)) => {
            println!("{} Search not found: {}", style("!").yellow().bold(), style(uid).bold());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to delete search '{}'", uid)),
    }
}

fn run_reload(config: &Config, defaults_only: bool) -> anyhow::Result<()> {
    let workflow = Workflow::open(config)?;
    let report = workflow
        .reload(defaults_only)
        .with_context(|| format!("Failed to update {}", config.document_path().display()))?;

    print_sync(&report);
    Ok(())
}

fn run_url(config: &Config, uid: &str, query: &str, suggest: bool) -> anyhow::Result<()> {
    let workflow = Workflow::open(config)?;
    let record = workflow
        .find(uid)?
        .ok_or_else(|| SearchioError::NotFound(uid.to_string()))?;

    let url = if suggest {
        record
            .suggest_url_for(query)
            .ok_or_else(|| anyhow::anyhow!("Search '{}' has no suggestion URL", uid))?
    } else {
        record.search_url_for(query)
    };

    println!("{}", url);
    Ok(())
}
