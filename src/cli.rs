//! Command-line interface definitions.
//!
//! A search can be described directly with flags, or by pointing
//! `--work-item` at a queued JSON payload. The WebDriver server URL can also
//! come from `WEBDRIVER_URL`.

use crate::models::{SearchQuery, SortOrder, WorkItem};
use crate::outputs::Format;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Two pages of the newest "space" stories, counting three phrases
/// latimes_search space -p space -p rocket -p NASA --sort-by Newest --max-pages 2
///
/// # Run a queued work item in a headless browser
/// latimes_search --work-item ./item.json --headless
///
/// # Replay saved pages offline with a custom layout
/// latimes_search space --replay-dir ./pages --layout ./layout.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Text to search for (required unless --work-item is given)
    pub query: Option<String>,

    /// Phrase to count in each result; repeat for several
    #[arg(short, long = "phrase")]
    pub phrases: Vec<String>,

    /// Relevance, Newest or Oldest (anything else means Newest)
    #[arg(short, long, default_value = "Relevance")]
    pub sort_by: String,

    /// Maximum number of result pages to visit
    #[arg(long, default_value_t = crate::models::DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// JSON work item providing query, phrases, sort_by and max_pages
    #[arg(short, long)]
    pub work_item: Option<PathBuf>,

    /// Directory for the results file and downloaded images
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Results file (defaults to search_results.<format> in the output directory)
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Results file format
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// YAML file overriding the page layout (selectors, timeouts, site URL)
    #[arg(short, long)]
    pub layout: Option<PathBuf>,

    /// WebDriver server to start the browser on
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Replay saved *.html pages from this directory instead of a browser
    #[arg(long)]
    pub replay_dir: Option<PathBuf>,
}

impl Cli {
    /// The search described by the work item, or else by the flags.
    pub fn search_query(&self) -> Result<SearchQuery, Box<dyn Error>> {
        if let Some(path) = &self.work_item {
            let payload = std::fs::read_to_string(path)?;
            let item: WorkItem = serde_json::from_str(&payload)?;
            info!(path = %path.display(), query = %item.query, "Loaded work item");
            return Ok(item.into());
        }

        let query = self
            .query
            .clone()
            .ok_or("a search query or --work-item is required")?;
        Ok(SearchQuery {
            phrases: self.phrases.clone(),
            sort_order: SortOrder::parse_lenient(&self.sort_by),
            max_pages: self.max_pages,
            ..SearchQuery::new(query)
        })
    }

    /// Where the results file goes.
    pub fn output_path(&self) -> PathBuf {
        self.output_file.clone().unwrap_or_else(|| {
            let extension = match self.format {
                Format::Csv => "csv",
                Format::Json => "json",
                Format::Xlsx => "xlsx",
            };
            self.output_dir.join(format!("search_results.{extension}"))
        })
    }
}
