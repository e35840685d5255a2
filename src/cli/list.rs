//! `searchio list`
//!
//! Alfred script-filter feedback by default, a plain table with `--text`.

use std::collections::BTreeMap;

use clap::Args;
use console::style;
use serde::Serialize;

use crate::config::Config;
use crate::core::record::SearchRecord;
use crate::services::filter::SearchFilter;
use crate::workflow::Workflow;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print a text table instead of Alfred JSON
    #[arg(short = 't', long)]
    pub text: bool,

    /// Narrow the list by title
    pub query: Option<String>,
}

/// Script-filter feedback document.
#[derive(Debug, Serialize)]
pub struct Feedback {
    pub items: Vec<FeedbackItem>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackItem {
    pub title: String,
    pub subtitle: String,
    pub arg: String,
    pub uid: String,
    pub autocomplete: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<FeedbackIcon>,
    pub variables: BTreeMap<String, String>,
    pub mods: BTreeMap<String, FeedbackModifier>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackIcon {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackModifier {
    pub subtitle: String,
    pub arg: String,
    pub valid: bool,
    pub variables: BTreeMap<String, String>,
}

fn variables(action: &str, uid: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("action".to_string(), action.to_string()),
        ("search".to_string(), uid.to_string()),
    ])
}

impl From<&SearchRecord> for FeedbackItem {
    fn from(record: &SearchRecord) -> Self {
        let subtitle = if record.keyword.is_empty() {
            "No keyword".to_string()
        } else {
            format!("Keyword: {}", record.keyword)
        };

        let delete = FeedbackModifier {
            subtitle: "Delete search".to_string(),
            arg: record.uid.clone(),
            valid: true,
            variables: variables("delete", &record.uid),
        };

        Self {
            title: record.title.clone(),
            subtitle,
            arg: record.uid.clone(),
            uid: record.uid.clone(),
            autocomplete: record.title.clone(),
            valid: true,
            icon: (!record.icon.is_empty()).then(|| FeedbackIcon {
                path: record.icon.clone(),
            }),
            variables: variables("reveal", &record.uid),
            mods: BTreeMap::from([("cmd".to_string(), delete)]),
        }
    }
}

/// Feedback for `records`, in order.
pub fn feedback(records: &[&SearchRecord]) -> Feedback {
    Feedback {
        items: records.iter().map(|r| FeedbackItem::from(*r)).collect(),
    }
}

/// Two-column table of uid and title.
pub fn table(records: &[&SearchRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.uid.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = format!("{:<width$}  {}\n", "ID", "Title", width = width);
    out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(5)));
    for record in records {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            record.uid,
            record.title,
            width = width
        ));
    }
    out
}

pub fn run_list(config: &Config, args: &ListArgs) -> anyhow::Result<()> {
    let workflow = Workflow::open(config)?;
    let searches = workflow.searches()?;

    let query = args.query.as_deref().unwrap_or("");
    let matches = SearchFilter::new().filter(query, &searches);
    tracing::debug!(count = matches.len(), query = %query, "Listing searches");

    if args.text {
        eprintln!("{}", style("You have saved the following searches.").bold());
        print!("{}", table(&matches));
    } else {
        println!("{}", serde_json::to_string(&feedback(&matches))?);
    }

    Ok(())
}
