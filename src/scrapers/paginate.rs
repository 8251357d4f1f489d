//! Page-by-page crawl of the search results.
//!
//! ```text
//! Fetching ─► HasPage ─► Extracting ─► HasPage
//!                  │
//!                  ├──► Advancing ─► Fetching
//!                  └──► Stopping  ─► Done
//! ```
//!
//! The crawl stops at whichever comes first: the page limit, or a page
//! without a next-page control. A result list that never shows up is the
//! only fatal condition; individual results never fail the crawl.

use super::extract::ResultExtractor;
use crate::assets::AssetFetcher;
use crate::config::LayoutConfig;
use crate::driver::{DriverError, PageDriver};
use crate::models::SearchResultRecord;
use std::fmt;
use tracing::{debug, info, instrument};

/// Why a crawl ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page limit was zero; nothing was fetched.
    NoPages,
    /// The page limit was reached.
    PageLimit,
    /// The last visited page had no next-page control.
    NoNextPage,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoPages => "page limit is zero",
            Self::PageLimit => "page limit reached",
            Self::NoNextPage => "no next page",
        })
    }
}

/// Drives the crawl over result pages.
pub struct PaginationController<'a, F> {
    layout: &'a LayoutConfig,
    extractor: &'a ResultExtractor<'a, F>,
    max_pages: u32,
}

impl<'a, F: AssetFetcher> PaginationController<'a, F> {
    pub fn new(
        layout: &'a LayoutConfig,
        extractor: &'a ResultExtractor<'a, F>,
        max_pages: u32,
    ) -> Self {
        Self {
            layout,
            extractor,
            max_pages,
        }
    }

    /// Crawl from the currently loaded page, appending one record per result to `records`.
    ///
    /// Records are appended as they are extracted and `pages_visited` is
    /// bumped once a page's results are loaded, so both hold the progress so
    /// far even when a wait times out and an error is returned.
    #[instrument(level = "info", skip_all, fields(max_pages = self.max_pages))]
    pub async fn run<D: PageDriver>(
        &self,
        driver: &mut D,
        phrases: &[String],
        records: &mut Vec<SearchResultRecord>,
        pages_visited: &mut u32,
    ) -> Result<StopReason, DriverError> {
        if self.max_pages == 0 {
            info!("Page limit is zero; nothing to crawl");
            return Ok(StopReason::NoPages);
        }

        let layout = self.layout;
        let results_timeout = layout.timeouts.results();
        let mut page = 1;

        loop {
            // Fetching
            driver
                .await_visible(&layout.result_item, results_timeout)
                .await?;
            let elements = driver.find_all(&layout.result_item).await?;
            *pages_visited = page;
            info!(page, results = elements.len(), "Scraping results page");

            // Extracting
            for element in &elements {
                records.push(self.extractor.extract(element, phrases).await);
            }

            if driver.find_all(&layout.next_page).await?.is_empty() {
                info!(page, "No next page");
                return Ok(StopReason::NoNextPage);
            }

            // The next page exists but is never activated past the limit.
            if page >= self.max_pages {
                info!(page, "Page limit reached");
                return Ok(StopReason::PageLimit);
            }

            // Advancing
            debug!(page, "Moving to next page");
            driver.click(&layout.next_page).await?;
            driver
                .await_visible(&layout.result_item, results_timeout)
                .await?;
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FilenameGenerator;
    use crate::driver::replay::{ReplayDriver, ReplayLauncher};
    use crate::driver::DriverLauncher;
    use crate::testing::{search_page, RecordingFetcher};
    use std::path::PathBuf;

    async fn driver_on(launcher: ReplayLauncher) -> ReplayDriver {
        let mut driver = launcher.launch().await.unwrap();
        driver.open_site("page1.html").await.unwrap();
        driver
    }

    fn three_pages() -> ReplayLauncher {
        ReplayLauncher::new()
            .with_page("page1.html", search_page(1, 10, Some("page2.html")))
            .with_page("page2.html", search_page(11, 10, Some("page3.html")))
            .with_page("page3.html", search_page(21, 4, None))
    }

    async fn crawl(
        launcher: ReplayLauncher,
        max_pages: u32,
    ) -> (Result<StopReason, DriverError>, Vec<SearchResultRecord>, u32) {
        let layout = LayoutConfig::default();
        let fetcher = RecordingFetcher::default();
        let filenames = FilenameGenerator::default();
        let dir = PathBuf::from("output");
        let extractor = ResultExtractor::new(&layout, &fetcher, &filenames, &dir);
        let controller = PaginationController::new(&layout, &extractor, max_pages);

        let mut driver = driver_on(launcher).await;
        let mut records = Vec::new();
        let mut pages_visited = 0;
        let result = controller
            .run(&mut driver, &[], &mut records, &mut pages_visited)
            .await;
        assert_eq!(records.len(), fetcher.calls().len());
        (result, records, pages_visited)
    }

    #[tokio::test]
    async fn test_stops_at_page_limit_even_with_next_page() {
        let (result, records, pages_visited) = crawl(three_pages(), 2).await;
        assert_eq!(result.unwrap(), StopReason::PageLimit);
        assert_eq!(pages_visited, 2);
        assert_eq!(records.len(), 20);
        assert_eq!(records[19].title, "Space story 20");
    }

    #[tokio::test]
    async fn test_stops_when_no_next_page() {
        let (result, records, pages_visited) = crawl(three_pages(), 10).await;
        assert_eq!(result.unwrap(), StopReason::NoNextPage);
        assert_eq!(pages_visited, 3);
        assert_eq!(records.len(), 24);
    }

    #[tokio::test]
    async fn test_zero_pages_fetches_nothing() {
        let (result, records, pages_visited) = crawl(three_pages(), 0).await;
        assert_eq!(result.unwrap(), StopReason::NoPages);
        assert_eq!(pages_visited, 0);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_single_page_limit() {
        let (result, records, pages_visited) = crawl(three_pages(), 1).await;
        assert_eq!(result.unwrap(), StopReason::PageLimit);
        assert_eq!(pages_visited, 1);
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_missing_result_list_is_fatal_and_keeps_earlier_records() {
        let launcher = ReplayLauncher::new()
            .with_page("page1.html", search_page(1, 10, Some("broken.html")))
            .with_page("broken.html", "<html><body><p>Something went wrong</p></body></html>");

        let (result, records, pages_visited) = crawl(launcher, 5).await;
        assert!(matches!(result, Err(DriverError::Timeout { .. })));
        assert_eq!(records.len(), 10);
        assert_eq!(pages_visited, 1);
    }

    #[tokio::test]
    async fn test_failure_on_third_page_counts_two_pages_visited() {
        let launcher = ReplayLauncher::new()
            .with_page("page1.html", search_page(1, 10, Some("page2.html")))
            .with_page("page2.html", search_page(11, 10, Some("page3.html")))
            .with_page("page3.html", "<html><body><p>Something went wrong</p></body></html>");

        let (result, records, pages_visited) = crawl(launcher, 5).await;
        assert!(matches!(result, Err(DriverError::Timeout { .. })));
        assert_eq!(records.len(), 20);
        assert_eq!(pages_visited, 2);
    }

    #[tokio::test]
    async fn test_first_page_without_results_is_fatal() {
        let launcher = ReplayLauncher::new()
            .with_page("page1.html", "<html><body><p>Loading...</p></body></html>");

        let (result, records, pages_visited) = crawl(launcher, 5).await;
        assert!(matches!(result, Err(DriverError::Timeout { .. })));
        assert!(records.is_empty());
        assert_eq!(pages_visited, 0);
    }
}
