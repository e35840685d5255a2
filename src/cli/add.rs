//! `searchio add`

use anyhow::Context;
use clap::Args;
use console::style;

use super::print_sync;
use crate::config::Config;
use crate::core::record::NewSearch;
use crate::workflow::Workflow;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Read the search from workflow variables instead of arguments
    #[arg(long)]
    pub env: bool,

    /// Keyword that triggers the search
    #[arg(required_unless_present = "env")]
    pub keyword: Option<String>,

    /// Name of the search
    #[arg(required_unless_present = "env")]
    pub title: Option<String>,

    /// Search URL containing {query}
    #[arg(required_unless_present = "env")]
    pub url: Option<String>,

    /// Suggestion URL containing {query}
    #[arg(short = 's', long = "suggest", value_name = "URL")]
    pub suggest: Option<String>,

    /// Icon path relative to the workflow
    #[arg(short = 'i', long, value_name = "PATH")]
    pub icon: Option<String>,

    /// JSON path of suggestions in the response
    #[arg(short = 'j', long = "json-path", value_name = "JPATH")]
    pub jsonpath: Option<String>,

    /// Uid of the search (generated if omitted)
    #[arg(short = 'u', long)]
    pub uid: Option<String>,

    /// Percent-encode the query (space becomes %20, not +)
    #[arg(short = 'p', long)]
    pub pcencode: bool,
}

impl AddArgs {
    /// The search as given on the command line.
    fn to_new_search(&self) -> NewSearch {
        NewSearch {
            uid: self.uid.clone(),
            keyword: self.keyword.clone().unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
            search_url: self.url.clone().unwrap_or_default(),
            suggest_url: self.suggest.clone(),
            icon: self.icon.clone(),
            percent_encode_query: self.pcencode,
            json_path: self.jsonpath.clone(),
        }
    }
}

pub fn run_add(config: &Config, args: AddArgs) -> anyhow::Result<()> {
    let search = if args.env {
        NewSearch::from_env()
    } else {
        args.to_new_search()
    };

    let record = search.into_record()?;
    let uid = record.uid.clone();
    let title = record.title.clone();

    let mut workflow = Workflow::open(config)?;
    let report = workflow
        .add(record)
        .with_context(|| format!("Failed to add search '{}'", title))?;

    println!(
        "{} {} {}",
        style("✓").green().bold(),
        style("Added").cyan(),
        style(format!("{} ({})", title, uid)).bold()
    );
    print_sync(&report);
    Ok(())
}
