//! Fuzzy narrowing of the search list.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::core::record::SearchRecord;

/// Narrows searches by a typed query.
pub struct SearchFilter {
    matcher: SkimMatcherV2,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Score one search against a lower-cased query.
    fn score(&self, record: &SearchRecord, query_lower: &str) -> Option<i64> {
        let title_score = self
            .matcher
            .fuzzy_match(&record.title.to_lowercase(), query_lower)?;

        // Typing the keyword itself should put that search first
        let keyword_boost = if record.keyword.eq_ignore_ascii_case(query_lower) {
            100
        } else {
            0
        };

        Some(title_score + keyword_boost)
    }

    /// Searches matching `query`, best match first.
    ///
    /// An empty query returns every search in its original order.
    pub fn filter<'a>(&self, query: &str, records: &'a [SearchRecord]) -> Vec<&'a SearchRecord> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return records.iter().collect();
        }

        let mut scored: Vec<(&SearchRecord, i64)> = records
            .iter()
            .filter_map(|r| self.score(r, &query_lower).map(|s| (r, s)))
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.title.cmp(&b.0.title)));
        scored.into_iter().map(|(r, _)| r).collect()
    }
}
