//! Page automation capabilities consumed by the scraping pipeline.
//!
//! The pipeline never talks to a browser directly. It drives a [`PageDriver`]
//! and reads result [`PageElement`]s through a handful of primitives, which
//! keeps the crawl logic independent of how pages are actually rendered.
//!
//! # Implementations
//!
//! | Driver | Module | Backend |
//! |--------|--------|---------|
//! | Live browser | [`webdriver`] | `thirtyfour` against a WebDriver server |
//! | Saved pages | [`replay`] | `scraper` over HTML kept in memory |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod replay;
pub mod webdriver;

/// An opaque selector into the current page. All shipped drivers treat it as
/// a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure of a driver primitive.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out after {timeout:?} waiting for `{locator}`")]
    Timeout { locator: Locator, timeout: Duration },
    #[error("no element matches `{0}`")]
    NotFound(Locator),
    #[error("invalid locator `{locator}`: {reason}")]
    InvalidLocator { locator: Locator, reason: String },
    #[error("no page is loaded")]
    NoPage,
    #[error("navigation to {0} failed")]
    Navigation(String),
    #[error(transparent)]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
}

/// A rendered page that can be navigated and queried.
pub trait PageDriver {
    type Element: PageElement;

    /// Navigate to `url`.
    async fn open_site(&mut self, url: &str) -> Result<(), DriverError>;

    /// Wait until an element matching `locator` is visible.
    ///
    /// Fails with [`DriverError::Timeout`] once `timeout` has elapsed.
    async fn await_visible(&mut self, locator: &Locator, timeout: Duration)
    -> Result<(), DriverError>;

    /// Click the first element matching `locator`.
    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Type `text` into the first element matching `locator`.
    async fn input_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Press Enter in the first element matching `locator`.
    async fn press_enter(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Choose the `<option>` with `value` in the `<select>` matching `locator`.
    async fn select_by_value(&mut self, locator: &Locator, value: &str)
    -> Result<(), DriverError>;

    /// Every element currently matching `locator`, in document order.
    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<Self::Element>, DriverError>;

    /// Release the underlying browser resource.
    async fn close(self) -> Result<(), DriverError>;
}

/// A handle to one element of a page.
pub trait PageElement: Sized {
    /// First descendant matching `locator`, or `None` when there is none.
    async fn find_child(&self, locator: &Locator) -> Result<Option<Self>, DriverError>;

    /// Rendered text content.
    async fn text(&self) -> Result<String, DriverError>;

    /// Value of attribute `name`, or `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;
}

/// Acquires a fresh driver for one search session.
pub trait DriverLauncher {
    type Driver: PageDriver;

    async fn launch(&self) -> Result<Self::Driver, DriverError>;
}
