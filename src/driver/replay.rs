//! Offline driver that replays saved HTML pages.
//!
//! Pages are registered under the URL they were saved from. Clicking an
//! element with an `href` loads the page stored under that href, resolved
//! against the current URL when it is relative. Pages never change after
//! loading, so a visibility wait succeeds immediately when its locator
//! matches and times out immediately when it does not.
//!
//! Typing, Enter and `<select>` changes are recorded but do not navigate;
//! a saved search-results page stands in for the site root.

use super::{DriverError, DriverLauncher, Locator, PageDriver, PageElement};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

fn selector(locator: &Locator) -> Result<Selector, DriverError> {
    Selector::parse(locator.as_str()).map_err(|e| DriverError::InvalidLocator {
        locator: locator.clone(),
        reason: e.to_string(),
    })
}

/// Saved pages keyed by URL, from which fresh [`ReplayDriver`]s are launched.
#[derive(Debug, Clone, Default)]
pub struct ReplayLauncher {
    pages: HashMap<String, String>,
}

impl ReplayLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `html` as the page served for `url`.
    #[cfg(test)]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Load every `*.html` file in `dir`, keyed by its file name.
    ///
    /// Links between saved pages should therefore be plain file names
    /// (`page2.html`).
    #[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
    pub fn from_dir(dir: &Path) -> Result<Self, Box<dyn Error>> {
        let mut launcher = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let html = std::fs::read_to_string(&path)?;
            launcher.pages.insert(name.to_string(), html);
        }
        info!(count = launcher.pages.len(), "Loaded saved pages");
        Ok(launcher)
    }
}

impl DriverLauncher for ReplayLauncher {
    type Driver = ReplayDriver;

    async fn launch(&self) -> Result<ReplayDriver, DriverError> {
        Ok(ReplayDriver {
            pages: self.pages.clone(),
            current: None,
            inputs: HashMap::new(),
        })
    }
}

struct LoadedPage {
    url: String,
    document: Html,
}

/// Driver session over saved pages.
pub struct ReplayDriver {
    pages: HashMap<String, String>,
    current: Option<LoadedPage>,
    inputs: HashMap<Locator, String>,
}

impl ReplayDriver {
    /// URL of the page currently loaded.
    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|page| page.url.as_str())
    }

    /// Last value typed or selected into the element at `locator`.
    #[cfg(test)]
    pub fn input_value(&self, locator: &Locator) -> Option<&str> {
        self.inputs.get(locator).map(String::as_str)
    }

    fn page(&self) -> Result<&LoadedPage, DriverError> {
        self.current.as_ref().ok_or(DriverError::NoPage)
    }

    fn first<'a>(&'a self, locator: &Locator) -> Result<ElementRef<'a>, DriverError> {
        let selector = selector(locator)?;
        self.page()?
            .document
            .select(&selector)
            .next()
            .ok_or_else(|| DriverError::NotFound(locator.clone()))
    }

    fn load(&mut self, url: &str) -> Result<(), DriverError> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| DriverError::Navigation(url.to_string()))?;
        debug!(%url, "Loading saved page");
        self.current = Some(LoadedPage {
            url: url.to_string(),
            document: Html::parse_document(html),
        });
        Ok(())
    }

    /// Key of the page an `href` on the current page points to.
    fn resolve(&self, href: &str) -> String {
        if self.pages.contains_key(href) {
            return href.to_string();
        }
        self.current_url()
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(href).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| href.to_string())
    }
}

impl PageDriver for ReplayDriver {
    type Element = ReplayElement;

    async fn open_site(&mut self, url: &str) -> Result<(), DriverError> {
        self.load(url)
    }

    async fn await_visible(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        match self.first(locator) {
            Ok(_) => Ok(()),
            Err(DriverError::NotFound(_) | DriverError::NoPage) => Err(DriverError::Timeout {
                locator: locator.clone(),
                timeout,
            }),
            Err(e) => Err(e),
        }
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let href = self.first(locator)?.value().attr("href").map(str::to_string);
        if let Some(href) = href {
            let target = self.resolve(&href);
            self.load(&target)?;
        }
        Ok(())
    }

    async fn input_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.first(locator)?;
        self.inputs
            .entry(locator.clone())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.first(locator)?;
        Ok(())
    }

    async fn select_by_value(
        &mut self,
        locator: &Locator,
        value: &str,
    ) -> Result<(), DriverError> {
        let select = self.first(locator)?;
        let option = selector(&Locator::new("option"))?;
        let known = select
            .select(&option)
            .any(|opt| opt.value().attr("value") == Some(value));
        if !known {
            return Err(DriverError::NotFound(Locator::new(format!(
                "{locator} option[value=\"{value}\"]"
            ))));
        }
        self.inputs.insert(locator.clone(), value.to_string());
        Ok(())
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ReplayElement>, DriverError> {
        let selector = selector(locator)?;
        Ok(self
            .page()?
            .document
            .select(&selector)
            .map(ReplayElement::from_ref)
            .collect())
    }

    async fn close(self) -> Result<(), DriverError> {
        debug!(url = ?self.current_url(), "Replay session closed");
        Ok(())
    }
}

/// A detached copy of one element's markup.
#[derive(Debug, Clone)]
pub struct ReplayElement {
    html: String,
}

impl ReplayElement {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
        }
    }

    /// Re-parse the markup and hand its outermost element to `f`.
    fn with_root<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Result<T, DriverError> {
        let fragment = Html::parse_fragment(&self.html);
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .ok_or(DriverError::NoPage)?;
        Ok(f(root))
    }
}

impl PageElement for ReplayElement {
    async fn find_child(&self, locator: &Locator) -> Result<Option<Self>, DriverError> {
        let selector = selector(locator)?;
        self.with_root(|root| root.select(&selector).next().map(ReplayElement::from_ref))
    }

    async fn text(&self) -> Result<String, DriverError> {
        self.with_root(|root| {
            root.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.with_root(|root| root.value().attr(name).map(str::to_string))
    }
}
