//! One complete search run, from opening the site to the collected records.
//!
//! A session launches a driver, types the query, applies the sort order and
//! hands over to the [`PaginationController`]. The driver is closed on every
//! way out of the run, panics included, and failures are logged rather than
//! returned: the caller always gets a [`SearchReport`], possibly with no
//! records in it.

use super::extract::ResultExtractor;
use super::paginate::{PaginationController, StopReason};
use crate::assets::{AssetFetcher, FilenameGenerator};
use crate::config::LayoutConfig;
use crate::driver::{DriverError, DriverLauncher, PageDriver};
use crate::models::{SearchQuery, SearchResultRecord};
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The crawl ran to one of its normal stopping points.
    Completed(StopReason),
    /// A step failed; the records gathered before it are kept.
    Aborted(String),
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(reason) => write!(f, "completed ({reason})"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Everything a session produced.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Records in extraction order.
    pub records: Vec<SearchResultRecord>,
    pub pages_visited: u32,
    pub termination: Termination,
}

/// Orchestrates a search run against one site layout.
pub struct SearchSession<L, F> {
    launcher: L,
    fetcher: F,
    layout: LayoutConfig,
    filenames: FilenameGenerator,
    image_dir: PathBuf,
}

impl<L, F> SearchSession<L, F>
where
    L: DriverLauncher,
    F: AssetFetcher,
{
    pub fn new(launcher: L, fetcher: F, layout: LayoutConfig, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            launcher,
            fetcher,
            layout,
            filenames: FilenameGenerator::default(),
            image_dir: image_dir.into(),
        }
    }

    /// Run `query` to completion. Never fails; see [`SearchReport::termination`].
    #[instrument(level = "info", skip_all, fields(query = %query.query, sort = ?query.sort_order, max_pages = query.max_pages))]
    pub async fn search(&self, query: &SearchQuery) -> SearchReport {
        let t0 = Instant::now();
        info!("Starting search");

        let mut records = Vec::new();
        let mut pages_visited = 0;

        let termination = match self.launcher.launch().await {
            Err(e) => {
                error!(error = %e, "Could not start browser");
                Termination::Aborted(e.to_string())
            }
            Ok(mut driver) => {
                let run = AssertUnwindSafe(self.drive(
                    &mut driver,
                    query,
                    &mut records,
                    &mut pages_visited,
                ))
                    .catch_unwind()
                    .await;

                if let Err(e) = driver.close().await {
                    warn!(error = %e, "Failed to close browser");
                }

                match run {
                    Ok(Ok(reason)) => Termination::Completed(reason),
                    Ok(Err(e)) => {
                        error!(error = %e, "Error during search");
                        Termination::Aborted(e.to_string())
                    }
                    Err(_) => {
                        error!("Search panicked");
                        Termination::Aborted("search panicked".to_string())
                    }
                }
            }
        };

        info!(
            records = records.len(),
            pages_visited,
            %termination,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search completed"
        );

        SearchReport {
            records,
            pages_visited,
            termination,
        }
    }

    async fn drive(
        &self,
        driver: &mut L::Driver,
        query: &SearchQuery,
        records: &mut Vec<SearchResultRecord>,
        pages_visited: &mut u32,
    ) -> Result<StopReason, DriverError> {
        let layout = &self.layout;
        let timeouts = &layout.timeouts;

        driver.open_site(&layout.site_url).await?;
        driver
            .await_visible(&layout.search_button, timeouts.site())
            .await?;
        driver.click(&layout.search_button).await?;

        driver
            .await_visible(&layout.search_input, timeouts.search_input())
            .await?;
        driver.input_text(&layout.search_input, &query.query).await?;
        driver.press_enter(&layout.search_input).await?;
        driver
            .await_visible(&layout.result_item, timeouts.results())
            .await?;

        driver
            .await_visible(&layout.sort_select, timeouts.site())
            .await?;
        driver
            .select_by_value(&layout.sort_select, query.sort_order.site_value())
            .await?;
        driver
            .await_visible(&layout.result_item, timeouts.results())
            .await?;
        info!(sort = ?query.sort_order, "Applied sort order");

        let extractor =
            ResultExtractor::new(layout, &self.fetcher, &self.filenames, &self.image_dir);
        PaginationController::new(layout, &extractor, query.max_pages)
            .run(driver, &query.phrases, records, pages_visited)
            .await
    }
}
