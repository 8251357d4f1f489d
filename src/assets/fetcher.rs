//! Thumbnail downloads.
//!
//! A failed download is never fatal to extraction: callers log the
//! [`DownloadError`] and record the result as having no image.

use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Why an image could not be saved.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Retrieves a remote asset and stores it under an output directory.
pub trait AssetFetcher {
    /// Download `url` into `output_dir/filename`, creating `output_dir` if needed.
    ///
    /// Returns the path of the written file.
    async fn fetch(
        &self,
        url: &str,
        filename: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError>;
}

/// [`AssetFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

impl AssetFetcher for HttpAssetFetcher {
    #[instrument(level = "debug", skip(self, output_dir), fields(output_dir = %output_dir.display()))]
    async fn fetch(
        &self,
        url: &str,
        filename: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let t0 = Instant::now();
        let request_error = |source| DownloadError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes().await.map_err(request_error)?;

        fs::create_dir_all(output_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let path = output_dir.join(filename);
        fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            path = %path.display(),
            bytes = bytes.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Image downloaded"
        );
        Ok(path)
    }
}
