//! pmcheck browser and suite layer
//!
//! Page models over a WebDriver session, per-test fixtures, the UI and API
//! scenarios, and the runner that executes them and writes results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TestRunner                                                 │
//! │    ├── run(mode) -> TestSuiteResult                         │
//! │    ├── write_results() -> reports/test-results.json         │
//! │    └── report::write_allure_results / generate / open       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  suites::registry()                                         │
//! │    ├── ui::*   UiContext  { driver, settings, data }        │
//! │    └── api::*  ApiContext { client, data }                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  fixture     with_browser, with_created_project             │
//! │  pages       LoginPage, ProjectsPage                        │
//! │  page        ElementHelper, Outcome, PageDriver             │
//! │  driver      BrowserSession (thirtyfour)                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod fixture;
pub mod page;
pub mod pages;
pub mod report;
pub mod runner;
pub mod suites;

#[cfg(test)]
mod fake;

pub use driver::{launch_browser, BrowserSession};
pub use error::{E2eError, E2eResult};
pub use fixture::{with_browser, with_created_project, CreatedProject, ScenarioFailure};
pub use page::{ElementHelper, Outcome, PageDriver, PageElement, TimedOut};
pub use pages::{LoginPage, ProjectsPage};
pub use runner::{RunMode, TestResult, TestRunner, TestSuiteResult};
pub use suites::{ApiContext, Scenario, ScenarioFn, SuiteKind, UiContext};
