//! UI suite

use anyhow::{ensure, Context};
use pmcheck_common::unique_title;

use super::UiContext;
use crate::page::PageDriver;
use crate::pages::ProjectsPage;

const INVALID_EMAIL: &str = "invalid@example.com";
const INVALID_PASSWORD: &str = "wrongpassword";

/// Log in with the configured account and land on the projects page
async fn logged_in_projects_page<D>(ctx: &UiContext<D>) -> anyhow::Result<ProjectsPage<D>>
where
    D: PageDriver + Clone,
{
    let login = ctx.login_page();
    login
        .login(&ctx.settings.test_email, &ctx.settings.test_password)
        .await?
        .into_result()
        .context("Could not log in")?;
    ensure!(login.is_login_successful().await?, "Login did not succeed");

    let projects = ctx.projects_page();
    projects.open_projects_page().await?;
    Ok(projects)
}

pub async fn successful_login<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let login = ctx.login_page();
    login.open_login_page().await?;
    login
        .login(&ctx.settings.test_email, &ctx.settings.test_password)
        .await?
        .into_result()
        .context("Could not log in")?;
    ensure!(login.is_login_successful().await?, "Login did not succeed");
    Ok(())
}

pub async fn login_with_invalid_credentials<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let login = ctx.login_page();
    login
        .login(INVALID_EMAIL, INVALID_PASSWORD)
        .await?
        .into_result()
        .context("Could not submit the login form")?;
    ensure!(
        login.is_error_message_present().await?,
        "No error message shown for invalid credentials"
    );
    Ok(())
}

pub async fn create_new_project<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let projects = logged_in_projects_page(&ctx).await?;

    let title = unique_title("Test Project");
    projects
        .create_project(&title, Some("Test project description"))
        .await?
        .into_result()
        .context("Could not create project")?;
    ensure!(
        projects.find_project_by_title(&title).await?,
        "Project {:?} not found in the list",
        title
    );
    Ok(())
}

pub async fn create_project_with_empty_title<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let projects = logged_in_projects_page(&ctx).await?;

    projects
        .create_project("", None)
        .await?
        .into_result()
        .context("Could not submit the project form")?;
    ensure!(
        projects.is_error_message_present().await?,
        "No error message shown for an empty title"
    );
    Ok(())
}

pub async fn edit_existing_project<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let projects = logged_in_projects_page(&ctx).await?;

    let original = unique_title("Original Project");
    projects
        .create_project(&original, None)
        .await?
        .into_result()
        .context("Could not create the project to edit")?;
    ensure!(
        projects.find_project_by_title(&original).await?,
        "Project {:?} not found",
        original
    );

    let renamed = unique_title("Updated Project");
    projects
        .edit_project(&original, &renamed, Some("Updated project description"))
        .await?
        .into_result()
        .context("Could not edit project")?;
    ensure!(
        projects.find_project_by_title(&renamed).await?,
        "Updated project {:?} not found",
        renamed
    );
    Ok(())
}

pub async fn delete_existing_project<D>(ctx: UiContext<D>) -> anyhow::Result<()>
where
    D: PageDriver + Clone,
{
    let projects = logged_in_projects_page(&ctx).await?;

    let title = unique_title("Doomed Project");
    projects
        .create_project(&title, None)
        .await?
        .into_result()
        .context("Could not create the project to delete")?;
    ensure!(
        projects.find_project_by_title(&title).await?,
        "Project {:?} not found",
        title
    );

    projects
        .delete_project(&title)
        .await?
        .into_result()
        .context("Could not delete project")?;
    ensure!(
        !projects.find_project_by_title(&title).await?,
        "Project {:?} is still listed after deletion",
        title
    );
    Ok(())
}
