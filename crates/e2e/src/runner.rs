//! Test runner that executes suites and collects results

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use pmcheck_api::ProjectsClient;
use pmcheck_common::{Settings, TestData};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::E2eResult;
use crate::fixture::{self, ScenarioFailure};
use crate::suites::{self, ApiContext, Scenario, ScenarioFn, SuiteKind, UiContext};

/// Which suites a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Ui,
    Api,
    #[default]
    All,
}

impl RunMode {
    pub fn includes(&self, suite: SuiteKind) -> bool {
        match self {
            RunMode::Ui => suite == SuiteKind::Ui,
            RunMode::Api => suite == SuiteKind::Api,
            RunMode::All => true,
        }
    }

    /// API-backed suites need a token
    pub fn needs_api_token(&self) -> bool {
        self.includes(SuiteKind::Api)
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" => Ok(RunMode::Ui),
            "api" => Ok(RunMode::Api),
            "all" => Ok(RunMode::All),
            other => Err(format!("unknown run mode: {}", other)),
        }
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub title: String,
    pub story: String,
    pub suite: SuiteKind,
    pub success: bool,
    /// Wall-clock start, milliseconds since the Unix epoch
    pub started_at_ms: i64,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios one at a time, each with its own fixtures
pub struct TestRunner {
    settings: Arc<Settings>,
    data: Arc<TestData>,
    shared_client: Option<ProjectsClient>,
}

impl TestRunner {
    pub fn new(settings: Settings, data: TestData) -> Self {
        Self {
            settings: Arc::new(settings),
            data: Arc::new(data),
            shared_client: None,
        }
    }

    /// Hand every API scenario this client instead of a fresh one per test
    pub fn with_api_client(mut self, client: ProjectsClient) -> Self {
        self.shared_client = Some(client);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A client with its own connection pool, unless one was injected
    fn api_client(&self) -> E2eResult<ProjectsClient> {
        if let Some(client) = &self.shared_client {
            return Ok(client.clone());
        }
        let client =
            ProjectsClient::new(&self.settings)?.with_expected_codes(self.data.codes.clone());
        Ok(client)
    }

    /// Run every registered scenario selected by `mode`
    pub async fn run(&mut self, mode: RunMode) -> E2eResult<TestSuiteResult> {
        let selected: Vec<Scenario> = suites::registry()
            .into_iter()
            .filter(|s| mode.includes(s.suite()))
            .collect();
        self.run_scenarios(&selected).await
    }

    /// Run a list of scenarios
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let skipped = 0;

        // Fail before the first scenario when no token is configured
        if scenarios.iter().any(|s| s.suite() == SuiteKind::Api) {
            self.api_client()?;
        }
        self.settings.ensure_output_dirs()?;

        info!("Running {} test(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await?;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run a single scenario with fresh fixtures
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> E2eResult<TestResult> {
        debug!("Running test: {} ({})", scenario.name, scenario.suite());
        let started_at_ms = chrono::Utc::now().timestamp_millis();
        let start = Instant::now();

        let outcome: Result<(), ScenarioFailure> = match scenario.run {
            ScenarioFn::Api(run) => {
                let ctx = ApiContext {
                    client: self.api_client()?,
                    data: self.data.clone(),
                };
                fixture::catch_failure(run(ctx))
                    .await
                    .map_err(ScenarioFailure::from)
            }
            ScenarioFn::Ui(run) => {
                let settings = self.settings.clone();
                let data = self.data.clone();
                fixture::with_browser(&self.settings, scenario.name, move |driver| {
                    run(UiContext {
                        driver,
                        settings,
                        data,
                    })
                })
                .await
            }
        };

        let (success, error, screenshot) = match outcome {
            Ok(()) => (true, None, None),
            Err(failure) => (false, Some(format!("{:#}", failure.error)), failure.screenshot),
        };

        Ok(TestResult {
            name: scenario.name.to_string(),
            title: scenario.title.to_string(),
            story: scenario.story.to_string(),
            suite: scenario.suite(),
            success,
            started_at_ms,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
            screenshot,
        })
    }

    /// Write test results to `<reports_dir>/test-results.json`
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.settings.reports_dir)?;

        let path = self.settings.reports_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            reports_dir: dir.join("reports"),
            screenshots_dir: dir.join("screenshots"),
            allure_results_dir: dir.join("allure-results"),
            ..Default::default()
        }
    }

    fn scenario(name: &'static str, run: fn(ApiContext) -> suites::ScenarioFuture) -> Scenario {
        Scenario {
            name,
            title: name,
            story: "runner",
            run: ScenarioFn::Api(run),
        }
    }

    #[test]
    fn test_run_mode_selection() {
        assert!(RunMode::Ui.includes(SuiteKind::Ui));
        assert!(!RunMode::Ui.includes(SuiteKind::Api));
        assert!(RunMode::All.includes(SuiteKind::Api));
        assert!(!RunMode::Ui.needs_api_token());
        assert!(RunMode::All.needs_api_token());
        assert_eq!("API".parse::<RunMode>().unwrap(), RunMode::Api);
        assert!("smoke".parse::<RunMode>().is_err());
    }

    #[tokio::test]
    async fn test_api_runs_require_a_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = TestRunner::new(settings(dir.path()), TestData::default());
        assert!(runner.run(RunMode::Api).await.is_err());
    }

    #[tokio::test]
    async fn test_failures_and_panics_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let client =
            ProjectsClient::with_token(&server.uri(), "token", Duration::from_secs(5)).unwrap();
        let mut runner =
            TestRunner::new(settings(dir.path()), TestData::default()).with_api_client(client);

        let scenarios = [
            scenario("lists", |ctx| {
                async move {
                    let response = ctx.client.get_all_projects().await?;
                    anyhow::ensure!(response.status_code() == 200, "bad status");
                    Ok(())
                }
                .boxed()
            }),
            scenario("fails", |_| {
                async { Err::<(), _>(anyhow::anyhow!("expected 201, got 400")) }.boxed()
            }),
            scenario("panics", |ctx| {
                async move {
                    assert!(ctx.data.users.contains_key("nobody"), "kaboom");
                    Ok(())
                }
                .boxed()
            }),
        ];

        let summary = runner.run_scenarios(&scenarios).await.unwrap();
        assert_eq!((summary.total, summary.passed, summary.failed), (3, 1, 2));
        assert!(!summary.is_success());
        assert_eq!(
            summary.results[1].error.as_deref(),
            Some("expected 201, got 400")
        );
        assert!(summary.results[2]
            .error
            .as_deref()
            .unwrap()
            .contains("kaboom"));
        assert!(summary.results.iter().all(|r| r.suite == SuiteKind::Api));

        let path = runner.write_results(&summary).unwrap();
        let written: TestSuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.failed, 2);
    }

    /// Minimal keep-alive HTTP server that counts accepted connections
    async fn counting_server() -> (String, Arc<std::sync::atomic::AtomicUsize>) {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    while let Ok(n) = stream.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                        let reply = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n[]";
                        if stream.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        (format!("http://{}", addr), accepted)
    }

    #[tokio::test]
    async fn test_each_api_scenario_gets_its_own_http_session() {
        let dir = tempfile::tempdir().unwrap();
        let (url, accepted) = counting_server().await;
        let settings = Settings {
            api_url: url,
            api_token: Some("token".to_string()),
            ..settings(dir.path())
        };
        let mut runner = TestRunner::new(settings, TestData::default());

        let list: fn(ApiContext) -> suites::ScenarioFuture = |ctx| {
            async move {
                let response = ctx.client.get_all_projects().await?;
                anyhow::ensure!(response.status_code() == 200, "bad status");
                Ok(())
            }
            .boxed()
        };
        let scenarios = [
            scenario("first", list),
            scenario("second", list),
            scenario("third", list),
        ];

        let summary = runner.run_scenarios(&scenarios).await.unwrap();
        assert_eq!(summary.passed, 3);
        assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
