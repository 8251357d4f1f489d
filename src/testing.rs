//! Test doubles shared by the unit tests.

use crate::assets::{AssetFetcher, DownloadError};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Records every fetch instead of touching the network or disk.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    fail: bool,
    calls: Mutex<Vec<(String, String, PathBuf)>>,
}

impl RecordingFetcher {
    /// A fetcher whose every download fails with a 503.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(url, filename, output_dir)` of each call, in order.
    pub fn calls(&self) -> Vec<(String, String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl AssetFetcher for RecordingFetcher {
    async fn fetch(
        &self,
        url: &str,
        filename: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        self.calls.lock().unwrap().push((
            url.to_string(),
            filename.to_string(),
            output_dir.to_path_buf(),
        ));
        if self.fail {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(output_dir.join(filename))
    }
}

/// Markup for one result item in the default layout.
pub fn result_item(n: usize) -> String {
    format!(
        r#"<li>
  <picture><source srcset="https://img.example.com/{n}.jpg 320w" alt=""></picture>
  <h3 class="promo-title"><a href="https://www.latimes.com/story/{n}">Space story {n}</a></h3>
  <p class="promo-description">Rocket news number {n}</p>
  <p class="promo-timestamp" data-timestamp="1714953600000">May 6, 2024</p>
</li>"#
    )
}

/// A full search page in the default layout with `count` results starting at
/// `first`, linking to `next` when given.
pub fn search_page(first: usize, count: usize, next: Option<&str>) -> String {
    let items: String = (first..first + count).map(result_item).collect();
    let next = next
        .map(|href| {
            format!(r#"<div class="search-results-module-next-page"><a href="{href}">Next</a></div>"#)
        })
        .unwrap_or_default();
    format!(
        r#"<html><body>
<button data-element="search-button">Search</button>
<input data-element="search-form-input" name="q">
<select name="s"><option value="0">Relevance</option><option value="1">Newest</option><option value="2">Oldest</option></select>
<ul class="search-results-module-results-menu">{items}</ul>
{next}
</body></html>"#
    )
}
