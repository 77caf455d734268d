//! REST handlers under `/api`.
//!
//! Each submodule exposes a `router()` over the shared [`AppState`]; they are
//! merged here. Handlers authenticate through the extractors in
//! [`crate::session`] and map repository failures with
//! [`RepositoryResultExt::or_api`].

mod auth;
mod certificates;
mod events;
mod notifications;
mod projects;
mod site;
mod threads;

use std::sync::Arc;

use axum::{Json, Router};
use serde_json::{json, Value};

use crate::action::{today_iso, ActionKind};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{ActionTarget, User};
use crate::AppState;

/// Every `/api` route.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::router())
        .merge(projects::router())
        .merge(events::router())
        .merge(threads::router())
        .merge(notifications::router())
        .merge(site::router())
        .merge(certificates::router())
}

/// A required text field: present and not blank.
pub(crate) fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Optional text field, with blank treated as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn ok_response() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub(crate) fn message_response(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}

/// Record `kind` by `user` on `target_id` and return the updated target.
pub(crate) async fn do_action(
    state: &AppState,
    kind: ActionKind,
    target_id: &str,
    user: &User,
    context: &'static str,
) -> Result<Json<ActionTarget>, ApiError> {
    let target = state
        .repository
        .apply_action(kind, target_id, &user.id, &today_iso())
        .await
        .or_api(context)?;
    Ok(Json(target))
}

/// Withdraw `kind` by `user` on `target_id` and return the updated target.
pub(crate) async fn undo_action(
    state: &AppState,
    kind: ActionKind,
    target_id: &str,
    user: &User,
    context: &'static str,
) -> Result<Json<ActionTarget>, ApiError> {
    let target = state
        .repository
        .revoke_action(kind, target_id, &user.id)
        .await
        .or_api(context)?;
    Ok(Json(target))
}

/// Whether the caller has performed `kind` on `target_id`. Anonymous callers
/// have performed nothing.
pub(crate) async fn has_acted(
    state: &AppState,
    kind: ActionKind,
    target_id: &str,
    user: Option<&User>,
    context: &'static str,
) -> Result<bool, ApiError> {
    let Some(user) = user else {
        return Ok(false);
    };
    state
        .repository
        .has_acted(kind, target_id, &user.id)
        .await
        .or_api(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            required(Some("x".to_string()), "missing").unwrap(),
            "x".to_string()
        );
        assert!(matches!(
            required(Some("   ".to_string()), "missing"),
            Err(ApiError::BadRequest(m)) if m == "missing"
        ));
        assert!(required(None, "missing").is_err());
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some(String::new())), None);
        assert_eq!(optional(Some("a".to_string())), Some("a".to_string()));
    }
}
