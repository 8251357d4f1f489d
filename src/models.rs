//! Data models for search queries and the records scraped from result pages.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SearchQuery`]: What to search for and how far to crawl
//! - [`SortOrder`]: The result ordering offered by the site's sort control
//! - [`SearchResultRecord`]: One extracted result with its analysis annotations
//! - [`WorkItem`]: A queued invocation payload that expands into a [`SearchQuery`]

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Page limit used when neither the command line nor a work item sets one.
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Result ordering offered by the search page's sort control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Relevance,
    Newest,
    Oldest,
}

impl SortOrder {
    /// Parse a user-supplied sort name.
    ///
    /// Matching ignores case and surrounding whitespace. Anything that is not
    /// one of the three known names falls back to [`SortOrder::Newest`].
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "relevance" => Self::Relevance,
            "newest" => Self::Newest,
            "oldest" => Self::Oldest,
            other => {
                tracing::warn!(sort_by = other, "Unknown sort order; falling back to Newest");
                Self::Newest
            }
        }
    }

    /// The value the site's sort `<select>` expects for this ordering.
    pub fn site_value(self) -> &'static str {
        match self {
            Self::Relevance => "0",
            Self::Newest => "1",
            Self::Oldest => "2",
        }
    }
}

/// Everything a single search run needs to know about what to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Text typed into the site's search box.
    pub query: String,
    /// Phrases counted in each result's title and description. May be empty.
    pub phrases: Vec<String>,
    pub sort_order: SortOrder,
    /// Upper bound on result pages visited. Zero means no page is fetched.
    pub max_pages: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            phrases: Vec::new(),
            sort_order: SortOrder::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// One scraped search result.
///
/// Every field has a default that is used when extraction of that field
/// fails, so a record is produced for every result element on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultRecord {
    /// Headline text, empty if it could not be extracted.
    pub title: String,
    /// Publication instant, `None` if missing or unparsable.
    pub published_at: Option<DateTime<Utc>>,
    /// Summary text, empty if it could not be extracted.
    pub description: String,
    /// Name of the downloaded thumbnail, empty if there was none or it failed.
    pub image_filename: String,
    /// Total case-insensitive occurrences of all phrases in `title + " " + description`.
    pub phrase_match_count: usize,
    /// Whether the same combined text mentions an amount of money.
    pub contains_money: bool,
    /// Link to the full story, empty if it could not be extracted.
    pub source_link: String,
}

/// A queued work item payload.
///
/// Only `query` is required; the rest fall back to the same defaults as the
/// command line.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    pub query: String,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl From<WorkItem> for SearchQuery {
    fn from(item: WorkItem) -> Self {
        Self {
            query: item.query,
            phrases: item.phrases,
            sort_order: item
                .sort_by
                .as_deref()
                .map(SortOrder::parse_lenient)
                .unwrap_or_default(),
            max_pages: item.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse_known_values() {
        assert_eq!(SortOrder::parse_lenient("Relevance"), SortOrder::Relevance);
        assert_eq!(SortOrder::parse_lenient("newest"), SortOrder::Newest);
        assert_eq!(SortOrder::parse_lenient("  OLDEST "), SortOrder::Oldest);
    }

    #[test]
    fn test_sort_order_unknown_falls_back_to_newest() {
        assert_eq!(SortOrder::parse_lenient("popularity"), SortOrder::Newest);
        assert_eq!(SortOrder::parse_lenient(""), SortOrder::Newest);
    }

    #[test]
    fn test_sort_order_site_values() {
        assert_eq!(SortOrder::Relevance.site_value(), "0");
        assert_eq!(SortOrder::Newest.site_value(), "1");
        assert_eq!(SortOrder::Oldest.site_value(), "2");
    }

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new("space");
        assert_eq!(query.sort_order, SortOrder::Relevance);
        assert_eq!(query.max_pages, 5);
        assert!(query.phrases.is_empty());
    }

    #[test]
    fn test_work_item_deserialization_with_defaults() {
        let json = r#"{ "query": "space" }"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        let query = SearchQuery::from(item);
        assert_eq!(query.query, "space");
        assert_eq!(query.sort_order, SortOrder::Relevance);
        assert_eq!(query.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_work_item_full_payload() {
        let json = r#"{
            "query": "space",
            "phrases": ["space", "rocket", "NASA"],
            "sort_by": "Newest",
            "max_pages": 2
        }"#;
        let query = SearchQuery::from(serde_json::from_str::<WorkItem>(json).unwrap());
        assert_eq!(query.phrases, vec!["space", "rocket", "NASA"]);
        assert_eq!(query.sort_order, SortOrder::Newest);
        assert_eq!(query.max_pages, 2);
    }

    #[test]
    fn test_work_item_rejects_negative_page_limit() {
        let json = r#"{ "query": "space", "max_pages": -1 }"#;
        assert!(serde_json::from_str::<WorkItem>(json).is_err());
    }

    #[test]
    fn test_default_record_is_empty() {
        let record = SearchResultRecord::default();
        assert!(record.title.is_empty());
        assert!(record.published_at.is_none());
        assert_eq!(record.phrase_match_count, 0);
        assert!(!record.contains_money);
    }
}
