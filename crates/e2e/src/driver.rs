//! WebDriver sessions
//!
//! Launches Chrome or Firefox through a running WebDriver server and adapts
//! `thirtyfour` handles to the [`PageDriver`] / [`PageElement`] seam.

use async_trait::async_trait;
use pmcheck_common::{BrowserKind, Locator, Settings};
use serde_json::{json, Map, Value};
use thirtyfour::{By, WebDriver, WebElement};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::page::{PageDriver, PageElement};

/// Command-line switches handed to the browser binary
pub fn browser_args(settings: &Settings) -> Vec<String> {
    let (width, height) = settings.window_size;
    let mut args = Vec::new();
    if settings.headless {
        args.push("--headless".to_string());
    }
    match settings.browser {
        BrowserKind::Chrome => {
            args.push(format!("--window-size={},{}", width, height));
            args.push("--no-sandbox".to_string());
            args.push("--disable-dev-shm-usage".to_string());
        }
        BrowserKind::Firefox => {
            args.push(format!("--width={}", width));
            args.push(format!("--height={}", height));
        }
    }
    args
}

/// W3C capabilities for a new session
///
/// No implicit wait is requested: all element waits are explicit polls in
/// the element helper.
pub fn capabilities(settings: &Settings) -> Map<String, Value> {
    let options_key = match settings.browser {
        BrowserKind::Chrome => "goog:chromeOptions",
        BrowserKind::Firefox => "moz:firefoxOptions",
    };

    let mut caps = Map::new();
    caps.insert("browserName".into(), json!(settings.browser.as_str()));
    caps.insert(
        "timeouts".into(),
        json!({ "pageLoad": settings.waits.page_load.as_millis() as u64 }),
    );
    caps.insert(options_key.into(), json!({ "args": browser_args(settings) }));
    caps
}

/// A live browser session
#[derive(Clone)]
pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }

    /// Underlying `thirtyfour` handle
    pub fn webdriver(&self) -> &WebDriver {
        &self.driver
    }

    /// End the session; failures are logged and swallowed
    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            debug!("Browser quit failed: {}", e);
        }
    }
}

/// Start a browser session for the configured browser
pub async fn launch_browser(settings: &Settings) -> E2eResult<BrowserSession> {
    info!(
        "Starting {} session via {} (headless: {})",
        settings.browser, settings.webdriver_url, settings.headless
    );

    WebDriver::new(settings.webdriver_url.as_str(), capabilities(settings))
        .await
        .map(BrowserSession::new)
        .map_err(|e| E2eError::SessionStartup {
            browser: settings.browser.to_string(),
            url: settings.webdriver_url.clone(),
            reason: e.to_string(),
        })
}

fn by(locator: &Locator) -> By {
    match locator {
        Locator::Css(v) => By::Css(v.as_str()),
        Locator::Name(v) => By::Name(v.as_str()),
        Locator::Id(v) => By::Id(v.as_str()),
        Locator::LinkText(v) => By::LinkText(v.as_str()),
        Locator::XPath(v) => By::XPath(v.as_str()),
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<WebElement>> {
        Ok(self.driver.find_all(by(locator)).await?)
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.driver.title().await?)
    }

    async fn screenshot_png(&self) -> E2eResult<Vec<u8>> {
        Ok(self.driver.screenshot_as_png().await?)
    }
}

#[async_trait]
impl PageElement for WebElement {
    async fn click(&self) -> E2eResult<()> {
        WebElement::click(self).await?;
        Ok(())
    }

    async fn clear(&self) -> E2eResult<()> {
        WebElement::clear(self).await?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> E2eResult<()> {
        WebElement::send_keys(self, text).await?;
        Ok(())
    }

    async fn text(&self) -> E2eResult<String> {
        Ok(WebElement::text(self).await?)
    }

    async fn is_displayed(&self) -> E2eResult<bool> {
        Ok(WebElement::is_displayed(self).await?)
    }

    async fn is_enabled(&self) -> E2eResult<bool> {
        Ok(WebElement::is_enabled(self).await?)
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<WebElement>> {
        Ok(WebElement::find_all(self, by(locator)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_chrome_headless_arguments() {
        let settings = Settings {
            headless: true,
            ..Default::default()
        };
        assert_eq!(
            browser_args(&settings),
            vec![
                "--headless",
                "--window-size=1920,1080",
                "--no-sandbox",
                "--disable-dev-shm-usage"
            ]
        );
    }

    #[test]
    fn test_firefox_arguments_without_headless() {
        let settings = Settings {
            browser: BrowserKind::Firefox,
            window_size: (1280, 720),
            ..Default::default()
        };
        assert_eq!(browser_args(&settings), vec!["--width=1280", "--height=720"]);
    }

    #[test]
    fn test_capabilities_carry_options_and_page_load_timeout() {
        let mut settings = Settings {
            browser: BrowserKind::Firefox,
            headless: true,
            ..Default::default()
        };
        settings.waits.page_load = Duration::from_secs(12);

        let caps = Value::Object(capabilities(&settings));
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["timeouts"]["pageLoad"], 12_000);
        assert_eq!(caps["moz:firefoxOptions"]["args"][0], "--headless");
        assert!(caps.get("goog:chromeOptions").is_none());
        assert!(caps["timeouts"].get("implicit").is_none());
    }
}
