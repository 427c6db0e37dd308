//! Test scenarios and their registry
//!
//! A scenario is a plain async function taking an owned context and
//! returning `anyhow::Result<()>`; failed assertions are `ensure!` errors.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use pmcheck_api::ProjectsClient;
use pmcheck_common::{Settings, TestData};
use serde::{Deserialize, Serialize};

use crate::driver::BrowserSession;
use crate::page::{ElementHelper, PageDriver};
use crate::pages::{LoginPage, ProjectsPage};

pub mod api;
pub mod ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKind {
    Ui,
    Api,
}

impl SuiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteKind::Ui => "ui",
            SuiteKind::Api => "api",
        }
    }

    /// Feature label used in reports
    pub fn feature(&self) -> &'static str {
        match self {
            SuiteKind::Ui => "UI tests",
            SuiteKind::Api => "API tests",
        }
    }
}

impl std::fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an API scenario gets
#[derive(Clone)]
pub struct ApiContext {
    pub client: ProjectsClient,
    pub data: Arc<TestData>,
}

/// What a UI scenario gets
#[derive(Clone)]
pub struct UiContext<D = BrowserSession> {
    pub driver: D,
    pub settings: Arc<Settings>,
    pub data: Arc<TestData>,
}

impl<D: PageDriver + Clone> UiContext<D> {
    pub fn helper(&self) -> ElementHelper<D> {
        ElementHelper::new(self.driver.clone(), self.settings.waits)
    }

    pub fn login_page(&self) -> LoginPage<D> {
        LoginPage::new(self.helper(), &self.settings, &self.data.selectors.login)
    }

    pub fn projects_page(&self) -> ProjectsPage<D> {
        ProjectsPage::new(self.helper(), &self.settings, &self.data.selectors.projects)
    }
}

pub type ScenarioFuture = BoxFuture<'static, anyhow::Result<()>>;

#[derive(Clone, Copy)]
pub enum ScenarioFn {
    Api(fn(ApiContext) -> ScenarioFuture),
    Ui(fn(UiContext) -> ScenarioFuture),
}

/// One named, runnable test
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    /// Human-readable title for reports
    pub title: &'static str,
    /// Report grouping within the suite
    pub story: &'static str,
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn suite(&self) -> SuiteKind {
        match self.run {
            ScenarioFn::Api(_) => SuiteKind::Api,
            ScenarioFn::Ui(_) => SuiteKind::Ui,
        }
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite())
            .finish()
    }
}

const LOGIN: &str = "Authorization";
const PROJECTS: &str = "Project management";

/// Every scenario, UI suite first
pub fn registry() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "successful_login",
            title: "Successful login with valid credentials",
            story: LOGIN,
            run: ScenarioFn::Ui(|ctx| ui::successful_login(ctx).boxed()),
        },
        Scenario {
            name: "login_with_invalid_credentials",
            title: "Login with invalid credentials shows an error",
            story: LOGIN,
            run: ScenarioFn::Ui(|ctx| ui::login_with_invalid_credentials(ctx).boxed()),
        },
        Scenario {
            name: "create_new_project",
            title: "Create a new project",
            story: PROJECTS,
            run: ScenarioFn::Ui(|ctx| ui::create_new_project(ctx).boxed()),
        },
        Scenario {
            name: "create_project_with_empty_title",
            title: "Create a project with an empty title shows an error",
            story: PROJECTS,
            run: ScenarioFn::Ui(|ctx| ui::create_project_with_empty_title(ctx).boxed()),
        },
        Scenario {
            name: "edit_existing_project",
            title: "Edit an existing project",
            story: PROJECTS,
            run: ScenarioFn::Ui(|ctx| ui::edit_existing_project(ctx).boxed()),
        },
        Scenario {
            name: "delete_existing_project",
            title: "Delete an existing project",
            story: PROJECTS,
            run: ScenarioFn::Ui(|ctx| ui::delete_existing_project(ctx).boxed()),
        },
        Scenario {
            name: "create_project_positive",
            title: "Create a project with valid data",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::create_project_positive(ctx).boxed()),
        },
        Scenario {
            name: "get_project_positive",
            title: "Get a project by id",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::get_project_positive(ctx).boxed()),
        },
        Scenario {
            name: "update_project_positive",
            title: "Update a project",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::update_project_positive(ctx).boxed()),
        },
        Scenario {
            name: "create_project_negative_empty_data",
            title: "Create a project with empty data is rejected",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::create_project_negative_empty_data(ctx).boxed()),
        },
        Scenario {
            name: "get_project_negative_nonexistent_id",
            title: "Get a nonexistent project returns 404",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::get_project_negative_nonexistent_id(ctx).boxed()),
        },
        Scenario {
            name: "delete_project_and_wait",
            title: "Deleted project disappears",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::delete_project_and_wait(ctx).boxed()),
        },
        Scenario {
            name: "list_projects_includes_created",
            title: "Project list contains a created project",
            story: PROJECTS,
            run: ScenarioFn::Api(|ctx| api::list_projects_includes_created(ctx).boxed()),
        },
    ]
}

/// Registry entries belonging to `suite`
pub fn scenarios_for(suite: SuiteKind) -> Vec<Scenario> {
    registry()
        .into_iter()
        .filter(|s| s.suite() == suite)
        .collect()
}
