//! Per-test fixtures
//!
//! Browser fixture: one fresh session per test, a `failed_<test>.png`
//! screenshot when the test fails or panics, and the session is always
//! closed. Project fixture: a project created through the API before the
//! body runs and deleted after it, whatever the body did.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context};
use futures::FutureExt;
use pmcheck_api::ProjectsClient;
use pmcheck_common::{ExpectedCodes, Settings};
use serde_json::Value;
use tracing::{info, warn};

use crate::driver::{launch_browser, BrowserSession};
use crate::error::E2eResult;
use crate::page::PageDriver;

/// A failed test, with the screenshot taken at the point of failure
#[derive(Debug)]
pub struct ScenarioFailure {
    pub error: anyhow::Error,
    pub screenshot: Option<PathBuf>,
}

impl From<anyhow::Error> for ScenarioFailure {
    fn from(error: anyhow::Error) -> Self {
        Self {
            error,
            screenshot: None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Await `body`, turning a panic into an error
pub async fn catch_failure<Fut, T>(body: Fut) -> anyhow::Result<T>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("test panicked: {}", panic_message(&*payload))),
    }
}

/// File name used for a failed test's screenshot
pub fn screenshot_file_name(test_name: &str) -> String {
    let safe: String = test_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("failed_{}.png", safe)
}

/// Save the current page as `<dir>/failed_<test_name>.png`
pub async fn capture_failure_screenshot<D: PageDriver>(
    driver: &D,
    dir: &Path,
    test_name: &str,
) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let png = driver.screenshot_png().await?;
    let path = dir.join(screenshot_file_name(test_name));
    std::fs::write(&path, png)?;
    info!("Saved failure screenshot to {}", path.display());
    Ok(path)
}

/// Run `body` against `driver`; on error or panic take a screenshot
pub async fn guard_with_screenshot<D, Fut, T>(
    driver: &D,
    screenshots_dir: &Path,
    test_name: &str,
    body: Fut,
) -> Result<T, ScenarioFailure>
where
    D: PageDriver,
    Fut: Future<Output = anyhow::Result<T>>,
{
    match catch_failure(body).await {
        Ok(value) => Ok(value),
        Err(error) => {
            let screenshot =
                match capture_failure_screenshot(driver, screenshots_dir, test_name).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("Could not save screenshot for {}: {}", test_name, e);
                        None
                    }
                };
            Err(ScenarioFailure { error, screenshot })
        }
    }
}

/// Give `body` a fresh browser session and close it afterwards
pub async fn with_browser<F, Fut, T>(
    settings: &Settings,
    test_name: &str,
    body: F,
) -> Result<T, ScenarioFailure>
where
    F: FnOnce(BrowserSession) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let session = launch_browser(settings)
        .await
        .map_err(|e| ScenarioFailure::from(anyhow::Error::from(e)))?;

    let result = guard_with_screenshot(
        &session,
        &settings.screenshots_dir,
        test_name,
        body(session.clone()),
    )
    .await;

    session.quit().await;
    result
}

/// A project created for the duration of one test
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub id: String,
    /// Body the service returned on create
    pub data: Value,
    /// Payload the project was created from
    pub request: Value,
}

impl CreatedProject {
    /// Create a project; the create status must be one of `codes.create`
    pub async fn create(
        client: &ProjectsClient,
        request: &Value,
        codes: &ExpectedCodes,
    ) -> anyhow::Result<Self> {
        let response = client.create_project(request).await?;
        ensure!(
            client.is_successful_response(&response, &codes.create),
            "Failed to create project: {}. Error: {}",
            response.status_code(),
            client.get_error_message(&response)
        );

        let data = response.json_value()?;
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .context("create response has no project id")?
            .to_string();

        info!("Created project {}", id);
        Ok(Self {
            id,
            data,
            request: request.clone(),
        })
    }

    /// Delete the project; the status must be one of `codes.cleanup`
    pub async fn cleanup(
        &self,
        client: &ProjectsClient,
        codes: &ExpectedCodes,
    ) -> anyhow::Result<()> {
        let response = client.delete_project(&self.id).await?;
        ensure!(
            client.is_successful_response(&response, &codes.cleanup),
            "Failed to cleanup project {}: {}",
            self.id,
            response.status_code()
        );
        Ok(())
    }
}

/// Run `body` with a freshly created project and delete it afterwards
///
/// Teardown runs even when the body fails or panics. A body failure wins
/// over a cleanup failure; the latter is then only logged.
pub async fn with_created_project<F, Fut, T>(
    client: &ProjectsClient,
    request: &Value,
    codes: &ExpectedCodes,
    body: F,
) -> anyhow::Result<T>
where
    F: FnOnce(CreatedProject) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let project = CreatedProject::create(client, request, codes).await?;

    let outcome = AssertUnwindSafe(body(project.clone())).catch_unwind().await;
    let cleanup = project.cleanup(client, codes).await;

    match outcome {
        Ok(Ok(value)) => cleanup.map(|_| value),
        Ok(Err(error)) => {
            if let Err(e) = cleanup {
                warn!("{:#}", e);
            }
            Err(error)
        }
        Err(payload) => {
            if let Err(e) = cleanup {
                warn!("{:#}", e);
            }
            panic::resume_unwind(payload)
        }
    }
}
