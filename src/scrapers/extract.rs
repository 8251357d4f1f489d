//! Turns one search-result element into a [`SearchResultRecord`].
//!
//! Title and link, description, publication date and thumbnail are each
//! extracted on their own. When a step fails its field keeps its default and
//! the failure is logged at error level; the other steps still run, so every
//! result element yields a record.

use crate::analysis::{contains_monetary_amount, count_phrase_occurrences};
use crate::assets::{AssetFetcher, DownloadError, FilenameGenerator};
use crate::config::LayoutConfig;
use crate::driver::{DriverError, Locator, PageElement};
use crate::models::SearchResultRecord;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Why a single field could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no element matches `{0}`")]
    Missing(Locator),
    #[error("`{locator}` has no `{attribute}` attribute")]
    MissingAttribute { locator: Locator, attribute: String },
    #[error("unparsable date {0:?}")]
    BadDate(String),
    #[error("`srcset` is empty")]
    EmptySrcset,
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Extracts records from result elements of the configured layout.
pub struct ResultExtractor<'a, F> {
    layout: &'a LayoutConfig,
    fetcher: &'a F,
    filenames: &'a FilenameGenerator,
    image_dir: &'a Path,
}

impl<'a, F: AssetFetcher> ResultExtractor<'a, F> {
    pub fn new(
        layout: &'a LayoutConfig,
        fetcher: &'a F,
        filenames: &'a FilenameGenerator,
        image_dir: &'a Path,
    ) -> Self {
        Self {
            layout,
            fetcher,
            filenames,
            image_dir,
        }
    }

    /// Build a record from `element`, annotating it against `phrases`.
    pub async fn extract<E: PageElement>(
        &self,
        element: &E,
        phrases: &[String],
    ) -> SearchResultRecord {
        let (title, source_link) = self
            .title_and_link(element)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Error processing title and link");
                Default::default()
            });

        let description = self.description(element).await.unwrap_or_else(|e| {
            error!(error = %e, "Error processing description");
            String::new()
        });

        let published_at = self.published_at(element).await.unwrap_or_else(|e| {
            error!(error = %e, "Error processing date");
            None
        });

        let image_filename = self.image(element, &title).await.unwrap_or_else(|e| {
            error!(error = %e, "Error processing image");
            String::new()
        });

        let combined = format!("{title} {description}");
        let record = SearchResultRecord {
            phrase_match_count: count_phrase_occurrences(&combined, phrases),
            contains_money: contains_monetary_amount(&combined),
            title,
            published_at,
            description,
            image_filename,
            source_link,
        };
        debug!(title = %record.title, phrases = record.phrase_match_count, money = record.contains_money, "Extracted result");
        record
    }

    async fn child<E: PageElement>(&self, element: &E, locator: &Locator) -> Result<E, ExtractError> {
        element
            .find_child(locator)
            .await?
            .ok_or_else(|| ExtractError::Missing(locator.clone()))
    }

    async fn title_and_link<E: PageElement>(
        &self,
        element: &E,
    ) -> Result<(String, String), ExtractError> {
        let anchor = self.child(element, &self.layout.title_link).await?;
        let title = anchor.text().await?.trim().to_string();
        let link = anchor
            .attribute("href")
            .await?
            .map(|href| self.absolute_link(href))
            .unwrap_or_default();
        Ok((title, link))
    }

    /// Resolve a relative story link against the site root.
    fn absolute_link(&self, href: String) -> String {
        if Url::parse(&href).is_ok() {
            return href;
        }
        Url::parse(&self.layout.site_url)
            .and_then(|base| base.join(&href))
            .map(String::from)
            .unwrap_or(href)
    }

    async fn description<E: PageElement>(&self, element: &E) -> Result<String, ExtractError> {
        let node = self.child(element, &self.layout.description).await?;
        Ok(node.text().await?.trim().to_string())
    }

    async fn published_at<E: PageElement>(
        &self,
        element: &E,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, ExtractError> {
        let source = &self.layout.published_at;
        let node = self.child(element, &source.locator).await?;
        let raw = node
            .attribute(&source.attribute)
            .await?
            .ok_or_else(|| ExtractError::MissingAttribute {
                locator: source.locator.clone(),
                attribute: source.attribute.clone(),
            })?;
        source
            .format
            .parse(&raw)
            .map(Some)
            .ok_or(ExtractError::BadDate(raw))
    }

    async fn image<E: PageElement>(&self, element: &E, title: &str) -> Result<String, ExtractError> {
        let locator = &self.layout.image_source;
        let source = self.child(element, locator).await?;
        let srcset = source
            .attribute("srcset")
            .await?
            .ok_or_else(|| ExtractError::MissingAttribute {
                locator: locator.clone(),
                attribute: "srcset".to_string(),
            })?;
        // First candidate URL; a bare URL is followed directly by its comma.
        let url = srcset
            .split_whitespace()
            .next()
            .map(|token| token.trim_end_matches(','))
            .filter(|token| !token.is_empty())
            .ok_or(ExtractError::EmptySrcset)?;
        let alt = source.attribute("alt").await?.unwrap_or_default();

        let filename = self.filenames.generate(title, &alt, url);
        self.fetcher.fetch(url, &filename, self.image_dir).await?;
        Ok(filename)
    }
}
