//! Discussion threads, comments and likes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{do_action, has_acted, ok_response, required, undo_action};
use crate::action::ActionKind;
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{
    ActionTarget, CommentWithAuthor, NewThread, Thread, ThreadComment, ThreadSummary,
};
use crate::session::{Governmental, MaybeSessionUser, SessionUser};
use crate::AppState;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/threads", get(list_threads).post(create_thread))
        .route("/api/threads/{id}", delete(delete_thread))
        .route(
            "/api/threads/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route("/api/threads/{id}/like", post(like))
        .route("/api/threads/{id}/unlike", post(unlike))
        .route("/api/threads/{id}/like-status", get(like_status))
        .route("/api/threads/{id}/pin", post(pin))
        .route("/api/threads/{id}/unpin", post(unpin))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThreadRequest {
    title_bn: Option<String>,
    title_en: Option<String>,
    content_bn: Option<String>,
    content_en: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentRequest {
    text: Option<String>,
}

async fn list_threads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    let threads = state
        .repository
        .list_threads()
        .await
        .or_api("Failed to fetch threads")?;
    Ok(Json(threads))
}

async fn create_thread(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Json(body): Json<CreateThreadRequest>,
) -> Result<Json<Thread>, ApiError> {
    const MISSING: &str = "All fields are required";

    let thread = NewThread {
        title_bn: required(body.title_bn, MISSING)?,
        title_en: required(body.title_en, MISSING)?,
        content_bn: required(body.content_bn, MISSING)?,
        content_en: required(body.content_en, MISSING)?,
        category: required(body.category, MISSING)?,
    };
    let thread = state
        .repository
        .create_thread(thread, &user.id)
        .await
        .or_api("Failed to create thread")?;
    Ok(Json(thread))
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommentWithAuthor>>, ApiError> {
    let comments = state
        .repository
        .list_comments(&id)
        .await
        .or_api("Failed to fetch comments")?;
    Ok(Json(comments))
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<ThreadComment>, ApiError> {
    let text = required(body.text, "Text is required")?;
    let comment = state
        .repository
        .add_comment(&id, &user.id, &text)
        .await
        .or_api("Failed to post comment")?;
    Ok(Json(comment))
}

async fn like(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(&state, ActionKind::ThreadLike, &id, &user, "Failed to like thread").await
}

async fn unlike(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    undo_action(&state, ActionKind::ThreadLike, &id, &user, "Failed to unlike thread").await
}

async fn like_status(
    State(state): State<Arc<AppState>>,
    MaybeSessionUser(user): MaybeSessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let liked = has_acted(
        &state,
        ActionKind::ThreadLike,
        &id,
        user.as_ref(),
        "Failed to get like status",
    )
    .await?;
    Ok(Json(json!({ "liked": liked })))
}

async fn set_pinned(
    state: &AppState,
    id: &str,
    pinned: bool,
    context: &'static str,
) -> Result<Json<Thread>, ApiError> {
    state
        .repository
        .set_thread_pinned(id, pinned)
        .await
        .or_api(context)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Thread not found"))
}

async fn pin(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Thread>, ApiError> {
    set_pinned(&state, &id, true, "Failed to pin").await
}

async fn unpin(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Thread>, ApiError> {
    set_pinned(&state, &id, false, "Failed to unpin").await
}

async fn delete_thread(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .delete_thread(&id)
        .await
        .or_api("Failed to delete thread")?;
    Ok(ok_response())
}
