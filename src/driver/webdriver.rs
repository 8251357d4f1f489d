//! Live browser driver over a WebDriver server (chromedriver, Selenium grid).

use super::{DriverError, DriverLauncher, Locator, PageDriver, PageElement};
use std::time::Duration;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tracing::{debug, info, instrument};

/// WebDriver code point for the Enter key.
const ENTER_KEY: &str = "\u{E007}";

/// How often a visibility wait re-queries the page.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Map a failed visibility wait onto [`DriverError`].
///
/// An expired query wait reports the element as missing; only that becomes
/// [`DriverError::Timeout`].
fn wait_error(error: WebDriverError, locator: &Locator, timeout: Duration) -> DriverError {
    match error {
        WebDriverError::NoSuchElement(_) | WebDriverError::Timeout(_) => {
            debug!(%locator, %error, "Visibility wait expired");
            DriverError::Timeout {
                locator: locator.clone(),
                timeout,
            }
        }
        other => DriverError::WebDriver(other),
    }
}

/// Starts Chrome sessions on a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    server_url: String,
    headless: bool,
}

impl WebDriverLauncher {
    pub fn new(server_url: impl Into<String>, headless: bool) -> Self {
        Self {
            server_url: server_url.into(),
            headless,
        }
    }
}

impl DriverLauncher for WebDriverLauncher {
    type Driver = WebDriverPage;

    #[instrument(level = "info", skip(self), fields(server_url = %self.server_url, headless = self.headless))]
    async fn launch(&self) -> Result<WebDriverPage, DriverError> {
        let mut caps = DesiredCapabilities::chrome();
        if self.headless {
            caps.set_headless()?;
        }
        let driver = WebDriver::new(&self.server_url, caps).await?;
        driver.maximize_window().await?;
        info!("Browser session started");
        Ok(WebDriverPage { driver })
    }
}

/// One browser session.
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    async fn first(&self, locator: &Locator) -> Result<WebElement, DriverError> {
        let mut found = self.driver.find_all(By::Css(locator.as_str())).await?;
        if found.is_empty() {
            return Err(DriverError::NotFound(locator.clone()));
        }
        Ok(found.swap_remove(0))
    }
}

impl PageDriver for WebDriverPage {
    type Element = WebDriverElement;

    async fn open_site(&mut self, url: &str) -> Result<(), DriverError> {
        debug!(%url, "Opening site");
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn await_visible(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.driver
            .query(By::Css(locator.as_str()))
            .wait(timeout, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await
            .map_err(|e| wait_error(e, locator, timeout))?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.first(locator).await?.click().await?;
        Ok(())
    }

    async fn input_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.first(locator).await?.send_keys(text).await?;
        Ok(())
    }

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.first(locator).await?.send_keys(ENTER_KEY).await?;
        Ok(())
    }

    async fn select_by_value(
        &mut self,
        locator: &Locator,
        value: &str,
    ) -> Result<(), DriverError> {
        let element = self.first(locator).await?;
        SelectElement::new(&element).await?.select_by_value(value).await?;
        Ok(())
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<WebDriverElement>, DriverError> {
        let elements = self.driver.find_all(By::Css(locator.as_str())).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn close(self) -> Result<(), DriverError> {
        self.driver.quit().await?;
        info!("Browser session closed");
        Ok(())
    }
}

/// An element of a live page.
pub struct WebDriverElement(WebElement);

impl PageElement for WebDriverElement {
    async fn find_child(&self, locator: &Locator) -> Result<Option<Self>, DriverError> {
        let found = self.0.find_all(By::Css(locator.as_str())).await?;
        Ok(found.into_iter().next().map(WebDriverElement))
    }

    async fn text(&self) -> Result<String, DriverError> {
        Ok(self.0.text().await?)
    }

    /// `href` is read as the DOM property, which the browser has already
    /// resolved to an absolute URL.
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        if name == "href" {
            return Ok(self.0.prop(name).await?);
        }
        Ok(self.0.attr(name).await?)
    }
}
