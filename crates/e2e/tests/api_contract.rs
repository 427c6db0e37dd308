//! API suite against an in-process stand-in of the projects service
//!
//! The stand-in keeps projects in memory and answers the way the hosted
//! service does (201 on create, 404 for unknown ids, 400 without a title),
//! so the whole API suite can run offline through the real runner.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pmcheck_api::ProjectsClient;
use pmcheck_common::{Settings, TestData};
use pmcheck_e2e::{report, RunMode, SuiteKind, TestRunner};
use serde_json::{json, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TOKEN: &str = "contract-token";

#[derive(Clone, Default)]
struct ProjectStore {
    projects: Arc<Mutex<BTreeMap<String, Value>>>,
    accept_empty_title: bool,
}

impl ProjectStore {
    fn len(&self) -> usize {
        self.projects.lock().unwrap().len()
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "message": "Project not found" }))
}

impl Respond for ProjectStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {}", TOKEN));
        if !authorized {
            return ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" }));
        }

        let segments: Vec<&str> = request
            .url
            .path()
            .trim_matches('/')
            .split('/')
            .collect();
        let mut projects = self.projects.lock().unwrap();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["projects"]) => {
                let content: Vec<Value> = projects.values().cloned().collect();
                ResponseTemplate::new(200).set_body_json(json!({
                    "paging": { "count": content.len(), "limit": 50, "offset": 0 },
                    "content": content,
                }))
            }
            ("POST", ["projects"]) => {
                let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
                let title = body["title"].as_str().unwrap_or_default();
                if title.is_empty() && !self.accept_empty_title {
                    return ResponseTemplate::new(400)
                        .set_body_json(json!({ "message": "title is required" }));
                }
                let id = uuid::Uuid::new_v4().to_string();
                projects.insert(id.clone(), json!({ "id": id, "title": title }));
                ResponseTemplate::new(201).set_body_json(json!({ "id": id }))
            }
            ("GET", ["projects", id]) => match projects.get(*id) {
                Some(project) => ResponseTemplate::new(200).set_body_json(project),
                None => not_found(),
            },
            ("PUT", ["projects", id]) => match projects.get_mut(*id) {
                Some(project) => {
                    let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
                    if let Some(title) = body.get("title") {
                        project["title"] = title.clone();
                    }
                    ResponseTemplate::new(200).set_body_json(json!({ "id": id }))
                }
                None => not_found(),
            },
            ("DELETE", ["projects", id]) => match projects.remove(*id) {
                Some(_) => ResponseTemplate::new(200).set_body_json(json!({ "id": id })),
                None => not_found(),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

async fn start(store: ProjectStore) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(store).mount(&server).await;
    server
}

fn runner(server: &MockServer, dir: &std::path::Path) -> TestRunner {
    let settings = Settings {
        api_url: server.uri(),
        api_token: Some(TOKEN.to_string()),
        reports_dir: dir.join("reports"),
        screenshots_dir: dir.join("screenshots"),
        allure_results_dir: dir.join("allure-results"),
        ..Default::default()
    };
    let client = ProjectsClient::with_token(&server.uri(), TOKEN, Duration::from_secs(5))
        .unwrap()
        .with_poll_interval(Duration::from_millis(10));
    TestRunner::new(settings, TestData::default()).with_api_client(client)
}

#[tokio::test]
async fn api_suite_passes_against_conforming_service() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore::default();
    let server = start(store.clone()).await;
    let mut runner = runner(&server, dir.path());

    let summary = runner.run(RunMode::Api).await.unwrap();

    let failures: Vec<_> = summary
        .results
        .iter()
        .filter(|r| !r.success)
        .map(|r| format!("{}: {}", r.name, r.error.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "failed scenarios: {:?}", failures);
    assert_eq!(summary.total, 7);
    assert!(summary.results.iter().all(|r| r.suite == SuiteKind::Api));

    // Every scenario cleans up after itself
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn lenient_service_fails_the_empty_payload_check_without_leaking() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore {
        accept_empty_title: true,
        ..Default::default()
    };
    let server = start(store.clone()).await;
    let mut runner = runner(&server, dir.path());

    let summary = runner.run(RunMode::Api).await.unwrap();

    let failed: Vec<&str> = summary
        .results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(failed, vec!["create_project_negative_empty_data"]);
    let error = summary
        .results
        .iter()
        .find(|r| !r.success)
        .and_then(|r| r.error.clone())
        .unwrap();
    assert!(error.contains("Expected [400, 422] for empty data, got 201"));
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn results_are_written_for_reporting() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(ProjectStore::default()).await;
    let mut runner = runner(&server, dir.path());

    let summary = runner.run(RunMode::Api).await.unwrap();
    let json_path = runner.write_results(&summary).unwrap();
    assert!(json_path.ends_with("reports/test-results.json"));

    let written =
        report::write_allure_results(&runner.settings().allure_results_dir, &summary).unwrap();
    assert_eq!(written.len(), summary.total);
    assert!(written
        .iter()
        .all(|p| p.to_string_lossy().ends_with("-result.json")));
}
