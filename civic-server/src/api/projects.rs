//! Projects, their upvotes, and the home-page polls built from them.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{do_action, has_acted, ok_response, optional, required, undo_action};
use crate::action::ActionKind;
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{ActionTarget, NewProject, Poll, Project, ProjectStatus};
use crate::session::{Governmental, MaybeSessionUser, SessionUser};
use crate::AppState;

/// Number of projects on the home page and in the poll list.
const TOP_LIMIT: usize = 4;

const DEFAULT_PROJECT_IMAGE: &str = "https://placehold.co/800x400/cccccc/000000?text=Project";

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/top", get(top_projects))
        .route("/api/projects/{id}", delete(delete_project))
        .route("/api/projects/{id}/upvote", post(upvote))
        .route("/api/projects/{id}/unvote", post(unvote))
        .route("/api/projects/{id}/vote-status", get(vote_status))
        .route("/api/projects/{id}/status", patch(update_status))
        .route("/api/polls", get(list_polls))
        .route("/api/polls/{id}/vote", post(poll_vote))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    title_en: Option<String>,
    title_bn: Option<String>,
    description_en: Option<String>,
    description_bn: Option<String>,
    category: Option<String>,
    status: Option<String>,
    budget: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: Option<String>,
}

fn parse_status(value: Option<String>) -> Result<ProjectStatus, ApiError> {
    value
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid status"))
}

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state
        .repository
        .list_projects()
        .await
        .or_api("Failed to fetch projects")?;
    Ok(Json(projects))
}

async fn top_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state
        .repository
        .top_projects(TOP_LIMIT)
        .await
        .or_api("Failed to fetch top projects")?;
    Ok(Json(projects))
}

async fn upvote(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(
        &state,
        ActionKind::ProjectUpvote,
        &id,
        &user,
        "Failed to upvote project",
    )
    .await
}

async fn unvote(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    undo_action(&state, ActionKind::ProjectUpvote, &id, &user, "Failed to remove vote").await
}

async fn vote_status(
    State(state): State<Arc<AppState>>,
    MaybeSessionUser(user): MaybeSessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let voted = has_acted(
        &state,
        ActionKind::ProjectUpvote,
        &id,
        user.as_ref(),
        "Failed to get vote status",
    )
    .await?;
    Ok(Json(json!({ "voted": voted })))
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Governmental(creator): Governmental,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    const MISSING: &str = "All required fields must be provided";

    let title_en = required(body.title_en, MISSING)?;
    let title_bn = required(body.title_bn, MISSING)?;
    let description_en = required(body.description_en, MISSING)?;
    let description_bn = required(body.description_bn, MISSING)?;
    let category = required(body.category, MISSING)?;
    let status = required(body.status, MISSING)?;
    let budget = required(body.budget, MISSING)?;
    let status = parse_status(Some(status))?;

    let project = state
        .repository
        .create_project(NewProject {
            title_bn,
            title_en,
            description_bn,
            description_en,
            category,
            budget,
            status,
            image_url: optional(body.image_url)
                .unwrap_or_else(|| DEFAULT_PROJECT_IMAGE.to_string()),
            upvotes: 0,
        })
        .await
        .or_api("Failed to create project")?;
    info!(project_id = %project.id, created_by = %creator.id, "Project created");
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .delete_project(&id)
        .await
        .or_api("Failed to delete project")?;
    Ok(ok_response())
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Project>, ApiError> {
    let status = parse_status(body.status)?;
    state
        .repository
        .update_project_status(&id, status)
        .await
        .or_api("Failed to update status")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

async fn list_polls(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Poll>>, ApiError> {
    let projects = state
        .repository
        .top_projects(TOP_LIMIT)
        .await
        .or_api("Failed to fetch polls")?;
    Ok(Json(projects.into_iter().map(Poll::from).collect()))
}

/// A poll vote is a project upvote under another name.
async fn poll_vote(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(&state, ActionKind::ProjectUpvote, &id, &user, "Failed to vote").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_accepts_known_values() {
        assert_eq!(
            parse_status(Some("Partially Active".to_string())).unwrap(),
            ProjectStatus::PartiallyActive
        );
        assert!(parse_status(Some("partially active".to_string())).is_err());
        assert!(parse_status(None).is_err());
    }
}
