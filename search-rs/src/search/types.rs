//! Search result types and data structures

use serde::{Deserialize, Serialize};

/// A single parsed search hit
///
/// Upstream titles commonly look like `"Site Name - Page Title"`; the portion
/// before the first `" - "` becomes `name` and the remainder keeps any
/// further separators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub name: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub image: Option<String>,
}

impl ResultItem {
    /// Build an item from a raw upstream title plus the remaining fields
    pub fn from_raw(
        raw_title: &str,
        link: Option<String>,
        snippet: Option<String>,
        image: Option<String>,
    ) -> Self {
        let (name, title) = match raw_title.split_once(" - ") {
            Some((name, rest)) => (name.to_string(), Some(rest.to_string())),
            None => (raw_title.to_string(), None),
        };

        Self {
            name,
            title,
            link,
            snippet,
            image,
        }
    }
}

/// Outcome of one metered search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<ResultItem>,
    pub queries_used: i64,
    pub queries_remaining: i64,
    pub results_per_query: i64,
}
