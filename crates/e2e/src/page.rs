//! Element interaction with bounded waits
//!
//! Every lookup polls until the element is ready or the wait runs out. Running
//! out is not an error: it comes back as [`Outcome::TimedOut`], so callers
//! branch on the type instead of catching anything. Real driver failures
//! (dead session, protocol errors) still surface as [`E2eError`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pmcheck_common::{Locator, Waits};
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::E2eResult;

/// A browser session as the page layer sees it
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: PageElement;

    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// All matches currently in the document; empty when there are none
    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<Self::Element>>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    async fn screenshot_png(&self) -> E2eResult<Vec<u8>>;
}

/// One element of the current document
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    async fn click(&self) -> E2eResult<()>;

    async fn clear(&self) -> E2eResult<()>;

    async fn send_keys(&self, text: &str) -> E2eResult<()>;

    async fn text(&self) -> E2eResult<String>;

    async fn is_displayed(&self) -> E2eResult<bool>;

    async fn is_enabled(&self) -> E2eResult<bool>;

    /// Matches among this element's descendants
    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<Self>>;
}

/// The element never became ready
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{locator} not ready within {waited:?}")]
pub struct TimedOut {
    pub locator: Locator,
    pub waited: Duration,
}

/// Result of a UI interaction: done, or timed out waiting for the element
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Done(T),
    TimedOut(TimedOut),
}

impl<T> Outcome<T> {
    pub(crate) fn timed_out(locator: &Locator, waited: Duration) -> Self {
        Outcome::TimedOut(TimedOut {
            locator: locator.clone(),
            waited,
        })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_timed_out(&self) -> bool {
        !self.is_done()
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::TimedOut(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, TimedOut> {
        match self {
            Outcome::Done(v) => Ok(v),
            Outcome::TimedOut(t) => Err(t),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Done(v) => Outcome::Done(f(v)),
            Outcome::TimedOut(t) => Outcome::TimedOut(t),
        }
    }

    /// Drop the value, keep done / timed out
    pub fn discard(self) -> Outcome {
        self.map(|_| ())
    }
}

impl Outcome<String> {
    /// Extracted text, or an empty string when the element never appeared
    pub fn text_or_empty(self) -> String {
        self.into_option().unwrap_or_default()
    }
}

/// Unwrap a `Done` value or return the `TimedOut` from the enclosing function
macro_rules! step {
    ($outcome:expr) => {
        match $outcome {
            $crate::page::Outcome::Done(value) => value,
            $crate::page::Outcome::TimedOut(t) => {
                return Ok($crate::page::Outcome::TimedOut(t));
            }
        }
    };
}
pub(crate) use step;

/// Wait-and-act helpers shared by every page model
#[derive(Debug, Clone)]
pub struct ElementHelper<D> {
    driver: D,
    waits: Waits,
}

impl<D: PageDriver> ElementHelper<D> {
    pub fn new(driver: D, waits: Waits) -> Self {
        Self { driver, waits }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn waits(&self) -> &Waits {
        &self.waits
    }

    /// Same driver, with both element and presence waits set to `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self
    where
        D: Clone,
    {
        Self {
            driver: self.driver.clone(),
            waits: Waits {
                element: timeout,
                presence: timeout,
                ..self.waits
            },
        }
    }

    pub async fn open(&self, url: &str) -> E2eResult<()> {
        debug!("Opening {}", url);
        self.driver.goto(url).await
    }

    /// First element matching `locator`
    pub async fn find_element(&self, locator: &Locator) -> E2eResult<Outcome<D::Element>> {
        self.poll(locator, self.waits.element, || async {
            Ok(self.driver.find_all(locator).await?.into_iter().next())
        })
        .await
    }

    /// Every element matching `locator` once at least one is present;
    /// empty if none showed up in time
    pub async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<D::Element>> {
        let found = self
            .poll(locator, self.waits.element, || async {
                let all = self.driver.find_all(locator).await?;
                Ok((!all.is_empty()).then_some(all))
            })
            .await?;
        Ok(found.into_option().unwrap_or_default())
    }

    /// Click the first match once it is displayed and enabled
    pub async fn click(&self, locator: &Locator) -> E2eResult<Outcome> {
        debug!("Click {}", locator);
        let element = step!(
            self.poll(locator, self.waits.element, || self.first_clickable(locator))
                .await?
        );
        element.click().await?;
        Ok(Outcome::Done(()))
    }

    /// Clear the first match and type `text` into it
    pub async fn send_keys(&self, locator: &Locator, text: &str) -> E2eResult<Outcome> {
        debug!("Type into {}", locator);
        let element = step!(self.find_element(locator).await?);
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(Outcome::Done(()))
    }

    pub async fn get_text(&self, locator: &Locator) -> E2eResult<Outcome<String>> {
        let element = step!(self.find_element(locator).await?);
        Ok(Outcome::Done(element.text().await?))
    }

    /// Presence check bounded by the (shorter) presence wait
    pub async fn is_element_present(&self, locator: &Locator) -> E2eResult<bool> {
        let found = self
            .poll(locator, self.waits.presence, || async {
                Ok(self.driver.find_all(locator).await?.into_iter().next())
            })
            .await?;
        Ok(found.is_done())
    }

    pub async fn wait_for_element_visible(&self, locator: &Locator) -> E2eResult<Outcome> {
        let found = self
            .poll(locator, self.waits.element, || async {
                for element in self.driver.find_all(locator).await? {
                    if element.is_displayed().await.unwrap_or(false) {
                        return Ok(Some(()));
                    }
                }
                Ok(None)
            })
            .await?;
        Ok(found)
    }

    pub async fn page_title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    async fn first_clickable(&self, locator: &Locator) -> E2eResult<Option<D::Element>> {
        for element in self.driver.find_all(locator).await? {
            // Elements can go stale between lookup and probe; treat as not ready.
            let displayed = element.is_displayed().await.unwrap_or(false);
            if displayed && element.is_enabled().await.unwrap_or(false) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn poll<T, F, Fut>(
        &self,
        locator: &Locator,
        timeout: Duration,
        mut probe: F,
    ) -> E2eResult<Outcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = probe().await? {
                return Ok(Outcome::Done(value));
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Timed out after {:?} waiting for {}", timeout, locator);
                return Ok(Outcome::timed_out(locator, timeout));
            }
            sleep(self.waits.poll_interval.min(deadline - now)).await;
        }
    }
}
