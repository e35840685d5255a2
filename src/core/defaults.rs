//! Built-in searches shipped with the workflow.

use super::record::{Origin, SearchRecord};

struct DefaultSearch {
    uid: &'static str,
    keyword: &'static str,
    title: &'static str,
    search_url: &'static str,
    suggest_url: &'static str,
    icon: &'static str,
    percent_encode_query: bool,
}

const DEFAULTS: &[DefaultSearch] = &[
    DefaultSearch {
        uid: "google-en",
        keyword: "g",
        title: "Google (English)",
        search_url: "https://www.google.com/search?q={query}&hl=en&safe=off",
        suggest_url: "https://suggestqueries.google.com/complete/search?client=firefox&q={query}&hl=en",
        icon: "icons/engines/google.png",
        percent_encode_query: false,
    },
    DefaultSearch {
        uid: "wikipedia-en",
        keyword: "w",
        title: "Wikipedia (English)",
        search_url: "https://en.wikipedia.org/wiki/{query}",
        suggest_url: "https://en.wikipedia.org/w/api.php?action=opensearch&search={query}",
        icon: "icons/engines/wikipedia.png",
        percent_encode_query: true,
    },
    DefaultSearch {
        uid: "youtube-us",
        keyword: "yt",
        title: "YouTube (United States)",
        search_url: "https://www.youtube.com/results?gl=us&persist_gl=1&search_query={query}",
        suggest_url: "https://suggestqueries.google.com/complete/search?client=firefox&ds=yt&hl=us&q={query}",
        icon: "icons/engines/youtube.png",
        percent_encode_query: false,
    },
];

/// JSON path shared by the built-in suggestion endpoints.
const DEFAULT_SUGGEST_PATH: &str = "$[1][*]";

/// The compiled-in default searches, in declaration order.
pub fn default_searches() -> Vec<SearchRecord> {
    DEFAULTS
        .iter()
        .map(|d| SearchRecord {
            uid: d.uid.to_string(),
            keyword: d.keyword.to_string(),
            title: d.title.to_string(),
            search_url: d.search_url.to_string(),
            suggest_url: Some(d.suggest_url.to_string()),
            icon: d.icon.to_string(),
            percent_encode_query: d.percent_encode_query,
            json_path: DEFAULT_SUGGEST_PATH.to_string(),
            origin: Origin::Default,
        })
        .collect()
}

/// Whether `uid` names a built-in search.
pub fn is_default_uid(uid: &str) -> bool {
    DEFAULTS.iter().any(|d| d.uid == uid)
}
