//! Page layout configuration.
//!
//! Every site-specific detail the pipeline depends on lives in
//! [`LayoutConfig`]: the site root, the CSS selectors for each control and
//! result field, the shape of the publication date, and the wait timeouts.
//! Defaults match the current LA Times search page; a YAML file can override
//! any subset of them when the site's markup changes.
//!
//! ```yaml
//! result_item: "ul.search-results-module-results-menu > li"
//! published_at:
//!   locator: "time.promo-timestamp"
//!   attribute: "datetime"
//!   format: iso8601
//! timeouts:
//!   results_secs: 45
//! ```

use crate::driver::Locator;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// How a publication date is encoded in its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// Milliseconds since the Unix epoch (`data-timestamp="1714953600000"`).
    EpochMillis,
    /// An ISO-8601 / RFC 3339 datetime (`datetime="2024-05-06T00:00:00Z"`).
    Iso8601,
}

impl DateFormat {
    /// Parse an attribute value, returning `None` when it does not fit the format.
    pub fn parse(self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        match self {
            Self::EpochMillis => value
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis),
            Self::Iso8601 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Where a result's publication date is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateSource {
    pub locator: Locator,
    pub attribute: String,
    pub format: DateFormat,
}

/// Bounded waits, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Site root until the search button shows.
    pub site_secs: u64,
    /// Search form until its input shows.
    pub search_input_secs: u64,
    /// Result list after submitting, sorting or changing page.
    pub results_secs: u64,
    /// Each thumbnail download.
    pub download_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            site_secs: 30,
            search_input_secs: 40,
            results_secs: 30,
            download_secs: 30,
        }
    }
}

impl Timeouts {
    pub fn site(&self) -> Duration {
        Duration::from_secs(self.site_secs)
    }

    pub fn search_input(&self) -> Duration {
        Duration::from_secs(self.search_input_secs)
    }

    pub fn results(&self) -> Duration {
        Duration::from_secs(self.results_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }
}

/// Selectors and timing for one version of the target site's markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub site_url: String,
    pub search_button: Locator,
    pub search_input: Locator,
    pub sort_select: Locator,
    /// One element per search result.
    pub result_item: Locator,
    /// The "next page" control; its absence ends the crawl.
    pub next_page: Locator,
    /// Relative to a result item. Its text is the title and its `href` the link.
    pub title_link: Locator,
    pub description: Locator,
    pub published_at: DateSource,
    /// Relative to a result item. Carries `srcset` and, optionally, `alt`.
    pub image_source: Locator,
    pub timeouts: Timeouts,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            site_url: "https://www.latimes.com/".to_string(),
            search_button: Locator::new(r#"button[data-element="search-button"]"#),
            search_input: Locator::new(r#"input[data-element="search-form-input"]"#),
            sort_select: Locator::new(r#"select[name="s"]"#),
            result_item: Locator::new("ul.search-results-module-results-menu > li"),
            next_page: Locator::new("div.search-results-module-next-page a"),
            title_link: Locator::new("h3.promo-title a"),
            description: Locator::new("p.promo-description"),
            published_at: DateSource {
                locator: Locator::new("p.promo-timestamp"),
                attribute: "data-timestamp".to_string(),
                format: DateFormat::EpochMillis,
            },
            image_source: Locator::new("picture source"),
            timeouts: Timeouts::default(),
        }
    }
}

impl LayoutConfig {
    /// Load a layout from YAML. Keys that are left out keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let yaml = std::fs::read_to_string(path)?;
        let layout = Self::from_yaml(&yaml)?;
        info!(site_url = %layout.site_url, "Loaded page layout");
        Ok(layout)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
