//! API suite

use anyhow::{ensure, Context};
use pmcheck_api::{ApiResponse, Project, ProjectPayload, DEFAULT_DELETION_ATTEMPTS};
use pmcheck_common::unique_title;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::ApiContext;
use crate::fixture::{with_created_project, CreatedProject};

fn unique_project(prefix: &str) -> Value {
    json!({ "title": unique_title(prefix) })
}

/// Fail with the expected codes, the actual one and the service's message
fn expect_status(
    ctx: &ApiContext,
    response: &ApiResponse,
    expected: &[u16],
) -> anyhow::Result<()> {
    ensure!(
        ctx.client.is_successful_response(response, expected),
        "Expected {:?}, got {}. Error: {}",
        expected,
        response.status_code(),
        ctx.client.get_error_message(response)
    );
    Ok(())
}

pub async fn create_project_positive(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let response = ctx.client.create_project(&unique_project("Test Project")).await?;
    expect_status(&ctx, &response, &codes.create)?;

    let body = response.json_value()?;
    let id = body
        .get("id")
        .context("Response should contain project ID")?
        .as_str()
        .context("Project ID should be string")?
        .to_string();
    ensure!(!id.is_empty(), "Project ID should not be empty");

    let cleanup = ctx.client.delete_project(&id).await?;
    ensure!(
        cleanup.is_one_of(&codes.cleanup),
        "Failed to cleanup project {}: {}",
        id,
        cleanup.status_code()
    );
    Ok(())
}

pub async fn get_project_positive(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let request = unique_project("Test Project");
    let ctx = &ctx;
    with_created_project(&ctx.client, &request, codes, |project| async move {
        let response = ctx.client.get_project(&project.id).await?;
        expect_status(ctx, &response, &codes.get)?;

        let fetched: Project = response.json()?;
        ensure!(fetched.id == project.id, "Project ID mismatch");
        ensure!(
            project.request["title"] == fetched.title.as_str(),
            "Project title mismatch: {}",
            fetched.title
        );
        Ok(())
    })
    .await
}

pub async fn update_project_positive(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let request = unique_project("Test Project");
    let ctx = &ctx;
    with_created_project(&ctx.client, &request, codes, |project| async move {
        let update = ProjectPayload::titled(unique_title("Updated Test Project"));
        let response = ctx.client.update_project(&project.id, &update).await?;
        expect_status(ctx, &response, &codes.update)?;

        let body = response.json_value()?;
        ensure!(body["id"] == project.id.as_str(), "Project ID mismatch");
        Ok(())
    })
    .await
}

/// Delete a project no fixture owns; problems are logged, not raised
async fn remove_stray_project(ctx: &ApiContext, id: &str) -> bool {
    match ctx.client.delete_project(id).await {
        Ok(response) if response.is_one_of(&ctx.data.codes.cleanup) => true,
        Ok(response) => {
            warn!(
                "Failed to cleanup project {}: {}. Error: {}",
                id,
                response.status_code(),
                response.error_message()
            );
            false
        }
        Err(e) => {
            warn!("Failed to cleanup project {}: {}", id, e);
            false
        }
    }
}

pub async fn create_project_negative_empty_data(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let response = ctx
        .client
        .create_project(&ctx.data.project("empty_project"))
        .await?;

    if response.is_one_of(&codes.create) {
        // The service accepted it; don't leave the project behind.
        let id = response
            .json_value()
            .ok()
            .and_then(|body| body["id"].as_str().map(String::from));
        if let Some(id) = id {
            warn!("Empty payload created project {}, removing it", id);
            remove_stray_project(&ctx, &id).await;
        }
    }

    ensure!(
        response.is_one_of(&codes.invalid_create),
        "Expected {:?} for empty data, got {}. Error: {}",
        codes.invalid_create,
        response.status_code(),
        response.error_message()
    );
    Ok(())
}

pub async fn get_project_negative_nonexistent_id(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let response = ctx
        .client
        .get_project(&ctx.data.nonexistent_project_id)
        .await?;
    ensure!(
        response.is_one_of(&codes.missing),
        "Expected {:?} for nonexistent project, got {}. Error: {}",
        codes.missing,
        response.status_code(),
        response.error_message()
    );
    Ok(())
}

pub async fn delete_project_and_wait(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let project =
        CreatedProject::create(&ctx.client, &unique_project("Doomed Project"), codes).await?;

    let response = ctx.client.delete_project(&project.id).await?;
    expect_status(&ctx, &response, &codes.cleanup)?;

    let gone = ctx
        .client
        .wait_for_project_deletion(&project.id, DEFAULT_DELETION_ATTEMPTS)
        .await;
    ensure!(gone, "Project {} still exists after deletion", project.id);
    info!("Project {} is gone", project.id);
    Ok(())
}

/// Project ids in a list response: a bare array or a `content` page
fn listed_ids(body: &Value) -> Vec<&str> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        other => other
            .get("content")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };
    items
        .iter()
        .filter_map(|item| item.get("id").and_then(Value::as_str))
        .collect()
}

pub async fn list_projects_includes_created(ctx: ApiContext) -> anyhow::Result<()> {
    let codes = &ctx.data.codes;
    let request = unique_project("Listed Project");
    let ctx = &ctx;
    with_created_project(&ctx.client, &request, codes, |project| async move {
        let response = ctx.client.get_all_projects().await?;
        expect_status(ctx, &response, &codes.get)?;

        let body = response.json_value()?;
        ensure!(
            listed_ids(&body).contains(&project.id.as_str()),
            "Project {} missing from the project list",
            project.id
        );
        Ok(())
    })
    .await
}
