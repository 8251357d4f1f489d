//! # LA Times Search
//!
//! Crawls the LA Times search results for a query and exports one row per
//! result: headline, publication date, summary, thumbnail file, how often
//! the configured phrases occur, whether money is mentioned, and the link.
//!
//! ## Usage
//!
//! ```sh
//! latimes_search space -p space -p rocket -p NASA --sort-by Newest --max-pages 2
//! ```
//!
//! ## Architecture
//!
//! 1. **Session**: Open the site in a browser, submit the query, apply the sort order
//! 2. **Pagination**: Visit result pages until the page limit or the last page
//! 3. **Extraction**: Build a record per result, download its thumbnail, analyze its text
//! 4. **Output**: Write the records as CSV or JSON next to the images

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod assets;
mod cli;
mod config;
mod driver;
mod models;
mod outputs;
mod scrapers;
#[cfg(test)]
mod testing;
mod utils;

use assets::HttpAssetFetcher;
use cli::Cli;
use config::LayoutConfig;
use driver::DriverLauncher;
use driver::replay::ReplayLauncher;
use driver::webdriver::WebDriverLauncher;
use models::SearchQuery;
use outputs::Format;
use scrapers::{SearchSession, Termination};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("latimes_search starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let query = args.search_query()?;
    let layout = match &args.layout {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };

    // Fail before the crawl rather than after it.
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetcher = HttpAssetFetcher::with_timeout(layout.timeouts.download())?;
    let output_path = args.output_path();

    let termination = match &args.replay_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Replaying saved pages");
            let launcher = ReplayLauncher::from_dir(dir)?;
            run(launcher, fetcher, layout, &query, &args.output_dir, &output_path, args.format).await
        }
        None => {
            let launcher = WebDriverLauncher::new(&args.webdriver_url, args.headless);
            run(launcher, fetcher, layout, &query, &args.output_dir, &output_path, args.format).await
        }
    }?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        %termination,
        "Execution complete"
    );

    Ok(())
}

/// Run one search session and export whatever it collected.
#[instrument(level = "info", skip_all, fields(output = %output_path.display()))]
async fn run<L: DriverLauncher>(
    launcher: L,
    fetcher: HttpAssetFetcher,
    layout: LayoutConfig,
    query: &SearchQuery,
    image_dir: &Path,
    output_path: &Path,
    format: Format,
) -> Result<Termination, Box<dyn Error>> {
    let session = SearchSession::new(launcher, fetcher, layout, image_dir);
    let report = session.search(query).await;

    if report.records.is_empty() {
        warn!("No records collected; writing an empty results file");
    }
    outputs::write_records(&report.records, output_path, format).await?;
    info!(
        count = report.records.len(),
        pages = report.pages_visited,
        "Results written"
    );

    if let Termination::Aborted(reason) = &report.termination {
        warn!(%reason, "Search ended early; results are partial");
    }
    Ok(report.termination)
}
