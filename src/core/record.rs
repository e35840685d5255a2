//! Search records.
//!
//! A [`SearchRecord`] is one search-engine definition: the keyword that
//! triggers it in the launcher, the URL templates used to search and to fetch
//! suggestions, and the icon shown next to it. Records come from three
//! sources (command-line flags, environment variables, files in the search
//! store) and every source goes through [`SearchRecord::normalized`], so they
//! are all validated the same way.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{SearchioError, SearchioResult};

/// Placeholder replaced by the (escaped) query in URL templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Directory, relative to the workflow, holding engine icons.
pub const ICON_ROOT: &str = "icons/engines";

/// Default JSON path used to extract suggestions.
pub const DEFAULT_JSON_PATH: &str = "[1]";

/// Query substituted into templates when validating them.
const SAMPLE_QUERY: &str = "searchio test";

/// Where an in-memory record came from. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Origin {
    /// Compiled-in default search.
    Default,
    /// Search saved by the user.
    #[default]
    User,
}

/// One search-engine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Stable identifier, also the file stem and the generated node id.
    #[serde(default)]
    pub uid: String,

    /// Keyword that triggers the search in the launcher.
    #[serde(default)]
    pub keyword: String,

    /// Display name, sort key and node label.
    #[serde(default)]
    pub title: String,

    /// Search URL template containing `{query}`.
    #[serde(default)]
    pub search_url: String,

    /// Suggestion URL template containing `{query}`.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggest_url: Option<String>,

    /// Icon path relative to the workflow directory.
    #[serde(default)]
    pub icon: String,

    /// Path-escape the query instead of query-escaping it.
    #[serde(rename = "pcencode", default)]
    pub percent_encode_query: bool,

    /// Path of the suggestions inside the suggestion response.
    #[serde(rename = "jsonpath", default = "default_json_path")]
    pub json_path: String,

    /// Source of the record; never persisted.
    #[serde(skip)]
    pub origin: Origin,
}

fn default_json_path() -> String {
    DEFAULT_JSON_PATH.to_string()
}

/// Treat `""` the same as a missing value.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Icon path for a title: the first word, lower-cased, under [`ICON_ROOT`].
///
/// "Amazon United States" → `icons/engines/amazon.png`.
pub fn derive_icon(title: &str) -> Option<String> {
    let word = title.split_whitespace().next()?.to_lowercase();
    Some(format!("{}/{}.png", ICON_ROOT, word))
}

/// Whether `uid` only uses characters that are safe in file names and in the
/// comma-joined deletion ledger.
pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && uid != "."
        && uid != ".."
}

/// Check that `template` becomes an absolute http(s) URL once the query is
/// substituted.
fn validate_template(field: &str, template: &str) -> SearchioResult<()> {
    if !template.contains(QUERY_PLACEHOLDER) {
        return Err(SearchioError::Validation(format!(
            "{} has no {} placeholder: {:?}",
            field, QUERY_PLACEHOLDER, template
        )));
    }

    let sample = template.replace(QUERY_PLACEHOLDER, &urlencoding::encode(SAMPLE_QUERY));
    let url = Url::parse(&sample).map_err(|e| {
        SearchioError::Validation(format!("invalid {}: {:?} ({})", field, template, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(SearchioError::Validation(format!(
            "invalid {}: {:?} is not an http(s) URL",
            field, template
        )));
    }

    Ok(())
}

impl SearchRecord {
    /// Fill derived fields and validate.
    ///
    /// This is the one validation path shared by every record source.
    pub fn normalized(mut self) -> SearchioResult<Self> {
        self.uid = self.uid.trim().to_string();
        self.keyword = self.keyword.trim().to_string();
        self.title = self.title.trim().to_string();
        self.search_url = self.search_url.trim().to_string();
        self.icon = self.icon.trim().to_string();
        self.suggest_url = self
            .suggest_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if self.icon.is_empty() {
            if let Some(icon) = derive_icon(&self.title) {
                self.icon = icon;
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Check the record invariants without modifying it.
    pub fn validate(&self) -> SearchioResult<()> {
        if !is_valid_uid(&self.uid) {
            return Err(SearchioError::Validation(format!(
                "uid {:?} must be non-empty and use only letters, digits, '-', '_' or '.'",
                self.uid
            )));
        }

        if self.title.is_empty() {
            return Err(SearchioError::Validation(format!(
                "search '{}' requires a title",
                self.uid
            )));
        }

        validate_template("search URL", &self.search_url)?;

        if let Some(ref suggest) = self.suggest_url {
            validate_template("suggest URL", suggest)?;
        }

        Ok(())
    }

    /// Parse a record from the contents of its store file.
    ///
    /// The file stem is authoritative for the uid.
    pub fn from_json(uid: &str, contents: &str) -> SearchioResult<Self> {
        let mut record: SearchRecord = serde_json::from_str(contents)?;
        record.uid = uid.to_string();
        record.origin = Origin::User;
        record.normalized()
    }

    /// Serialize for the search store: pretty JSON with sorted keys.
    pub fn to_json(&self) -> SearchioResult<String> {
        // serde_json::Map is ordered, so the value form sorts keys
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Escape a query according to `percent_encode_query`.
    pub fn escape_query(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        if self.percent_encode_query {
            encoded.into_owned()
        } else {
            encoded.replace("%20", "+")
        }
    }

    /// Search URL for `query`.
    pub fn search_url_for(&self, query: &str) -> String {
        self.search_url
            .replace(QUERY_PLACEHOLDER, &self.escape_query(query))
    }

    /// Suggestion URL for `query`, if the search has one.
    pub fn suggest_url_for(&self, query: &str) -> Option<String> {
        self.suggest_url
            .as_ref()
            .map(|u| u.replace(QUERY_PLACEHOLDER, &self.escape_query(query)))
    }
}

/// A search as entered by the user, before uid assignment and validation.
#[derive(Debug, Clone, Default)]
pub struct NewSearch {
    pub uid: Option<String>,
    pub keyword: String,
    pub title: String,
    pub search_url: String,
    pub suggest_url: Option<String>,
    pub icon: Option<String>,
    pub percent_encode_query: bool,
    pub json_path: Option<String>,
}

impl NewSearch {
    /// Build from workflow variables (`keyword`, `uid`, `pcencode`, `title`,
    /// `search_url`, `suggest_url`, `icon`, `jsonpath`).
    ///
    /// `lookup` is usually `std::env::var(..).ok()`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            uid: non_empty("uid"),
            keyword: lookup("keyword").unwrap_or_default(),
            title: lookup("title").unwrap_or_default(),
            search_url: lookup("search_url").unwrap_or_default(),
            suggest_url: non_empty("suggest_url"),
            icon: non_empty("icon"),
            percent_encode_query: lookup("pcencode").map(|v| v.trim() == "1").unwrap_or(false),
            json_path: non_empty("jsonpath"),
        }
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Assign a uid if none was given, derive missing fields and validate.
    pub fn into_record(self) -> SearchioResult<SearchRecord> {
        let uid = self
            .uid
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string().to_uppercase());

        SearchRecord {
            uid,
            keyword: self.keyword,
            title: self.title,
            search_url: self.search_url,
            suggest_url: self.suggest_url,
            icon: self.icon.unwrap_or_default(),
            percent_encode_query: self.percent_encode_query,
            json_path: self.json_path.unwrap_or_else(default_json_path),
            origin: Origin::User,
        }
        .normalized()
    }
}
