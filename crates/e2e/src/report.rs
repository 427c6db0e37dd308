//! Allure results and the `allure` command-line tool
//!
//! Each finished test becomes one `<uuid>-result.json` file in the results
//! directory (Allure 2 result format); a failure screenshot is copied next to
//! it as `<uuid>-attachment.png`. The HTML report itself is produced by the
//! external `allure` binary.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{E2eError, E2eResult};
use crate::runner::{TestResult, TestSuiteResult};

const ALLURE: &str = "allure";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub uuid: String,
    pub history_id: String,
    pub full_name: String,
    pub name: String,
    pub status: AllureStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: String,
    pub start: i64,
    pub stop: i64,
    pub labels: Vec<Label>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllureStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDetails {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub source: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl AllureResult {
    pub fn from_test(result: &TestResult) -> Self {
        let suite = result.suite;
        Self {
            uuid: Uuid::new_v4().to_string(),
            history_id: format!("{}.{}", suite, result.name),
            full_name: format!("pmcheck.{}.{}", suite, result.name),
            name: result.title.clone(),
            status: if result.success {
                AllureStatus::Passed
            } else {
                AllureStatus::Failed
            },
            status_details: result.error.clone().map(|message| StatusDetails { message }),
            stage: "finished".to_string(),
            start: result.started_at_ms,
            stop: result.started_at_ms + result.duration_ms as i64,
            labels: vec![
                Label::new("feature", suite.feature()),
                Label::new("story", &result.story),
                Label::new("suite", suite.as_str()),
                Label::new("framework", "pmcheck"),
            ],
            attachments: Vec::new(),
        }
    }
}

/// Write one result file per test into `results_dir`
pub fn write_allure_results(
    results_dir: &Path,
    summary: &TestSuiteResult,
) -> E2eResult<Vec<PathBuf>> {
    std::fs::create_dir_all(results_dir)?;

    let mut written = Vec::with_capacity(summary.results.len());
    for test in &summary.results {
        let mut result = AllureResult::from_test(test);

        if let Some(screenshot) = &test.screenshot {
            let source = format!("{}-attachment.png", result.uuid);
            match std::fs::copy(screenshot, results_dir.join(&source)) {
                Ok(_) => result.attachments.push(Attachment {
                    name: "Screenshot".to_string(),
                    source,
                    mime_type: "image/png".to_string(),
                }),
                Err(e) => warn!("Could not attach {}: {}", screenshot.display(), e),
            }
        }

        let path = results_dir.join(format!("{}-result.json", result.uuid));
        std::fs::write(&path, serde_json::to_string_pretty(&result)?)?;
        written.push(path);
    }

    info!(
        "Wrote {} Allure result(s) to {}",
        written.len(),
        results_dir.display()
    );
    Ok(written)
}

/// Where the generated HTML report lives
pub fn report_dir(reports_dir: &Path) -> PathBuf {
    reports_dir.join("allure-report")
}

fn run_allure(args: &[&str]) -> E2eResult<()> {
    let status: ExitStatus = Command::new(ALLURE).args(args).status().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            E2eError::AllureNotFound
        } else {
            E2eError::Io(e)
        }
    })?;

    if !status.success() {
        return Err(E2eError::Report(format!(
            "`allure {}` exited with {}",
            args.first().copied().unwrap_or_default(),
            status
        )));
    }
    Ok(())
}

/// `allure generate <results> -o <report> --clean`
pub fn generate(results_dir: &Path, report_dir: &Path) -> E2eResult<()> {
    info!("Generating Allure report into {}", report_dir.display());
    let results = results_dir.to_string_lossy();
    let report = report_dir.to_string_lossy();
    run_allure(&["generate", &results, "-o", &report, "--clean"])
}

/// `allure open <report>`; blocks while the report server runs
pub fn open(report_dir: &Path) -> E2eResult<()> {
    if !report_dir.exists() {
        return Err(E2eError::Report(format!(
            "no report at {}; run with --report first",
            report_dir.display()
        )));
    }
    info!("Opening Allure report {}", report_dir.display());
    let report = report_dir.to_string_lossy();
    run_allure(&["open", &report])
}
