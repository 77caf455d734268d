//! Registration, login and the governmental approval queue.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{message_response, ok_response, optional, required};
use crate::auth::{generate_session_token, hash_password, hash_session_token, verify_password};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{AccountProfile, NewAccount, PendingApproval, Role, User};
use crate::session::{session_token, Governmental, SessionUser};
use crate::AppState;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/approvals", get(list_approvals))
        .route("/api/approvals/{id}/approve", post(approve))
        .route("/api/approvals/{id}", delete(reject))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    id_type: Option<String>,
    id_number: Option<String>,
    building: Option<String>,
    floor: Option<String>,
    street: Option<String>,
    thana: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    mobile: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

/// scrypt on the blocking pool.
async fn hash_in_background(password: String, context: &'static str) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            ApiError::Internal(context)
        })?
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal(context)
        })
}

async fn verify_in_background(password: String, stored: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ApiError::Internal("Login failed")
        })
}

/// POST /api/auth/register
///
/// Stores the account as a pending approval; nobody can log in with it until
/// a governmental user approves it.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    const MISSING: &str = "All fields are required";

    let username = required(body.username, MISSING)?;
    let password = required(body.password, MISSING)?;
    let role = match optional(body.role) {
        Some(role) => role
            .parse::<Role>()
            .map_err(|_| ApiError::bad_request("Invalid role"))?,
        None => Role::Citizen,
    };
    let profile = AccountProfile {
        username: username.trim().to_string(),
        role,
        first_name: required(body.first_name, MISSING)?,
        last_name: required(body.last_name, MISSING)?,
        id_type: required(body.id_type, MISSING)?,
        id_number: required(body.id_number, MISSING)?,
        building: required(body.building, MISSING)?,
        floor: optional(body.floor),
        street: required(body.street, MISSING)?,
        thana: required(body.thana, MISSING)?,
        city: required(body.city, MISSING)?,
        postal_code: required(body.postal_code, MISSING)?,
        country: required(body.country, MISSING)?,
        mobile: required(body.mobile, MISSING)?,
    };
    let password_hash = hash_in_background(password, "Registration failed").await?;
    let pending = state
        .repository
        .submit_registration(NewAccount {
            profile,
            password_hash,
        })
        .await
        .or_api("Registration failed")?;

    info!(pending_id = %pending.id, role = %role, "Registration submitted");
    Ok(Json(json!({
        "message": "Registration submitted for approval",
        "id": pending.id,
    })))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (optional(body.username), body.password) else {
        return Err(ApiError::InvalidCredentials);
    };

    let user = state
        .repository
        .get_user_by_username(username.trim())
        .await
        .or_api("Login failed")?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_in_background(password, user.password_hash.clone()).await? {
        return Err(ApiError::InvalidCredentials);
    }

    if let Some(requested) = optional(body.role) {
        if requested != user.role().as_str() {
            return Err(ApiError::Forbidden("Invalid role for this account"));
        }
    }

    let token = generate_session_token();
    let expires_at = state
        .session_settings
        .expires_at(Utc::now())
        .ok_or_else(|| {
            error!("Session expiry overflows for ttl {}", state.session_settings.ttl);
            ApiError::Internal("Login failed")
        })?;
    state
        .repository
        .create_session(&hash_session_token(&token), &user.id, expires_at)
        .await
        .or_api("Login failed")?;

    info!(user_id = %user.id, role = %user.role(), "Session created");
    Ok((
        [(header::SET_COOKIE, state.session_settings.session_cookie(&token))],
        Json(json!({
            "id": user.id,
            "username": user.profile.username,
            "role": user.role(),
        })),
    ))
}

/// GET /api/auth/me
async fn me(SessionUser(user): SessionUser) -> Json<User> {
    Json(user)
}

/// POST /api/auth/logout
///
/// Always succeeds; a missing or unknown session is already logged out.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        state
            .repository
            .delete_session(&hash_session_token(&token))
            .await
            .or_api("Logout failed")?;
    }
    Ok((
        [(header::SET_COOKIE, state.session_settings.clear_cookie())],
        ok_response(),
    ))
}

/// GET /api/approvals
async fn list_approvals(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
) -> Result<Json<Vec<PendingApproval>>, ApiError> {
    let pending = state
        .repository
        .list_pending_approvals()
        .await
        .or_api("Failed to fetch approvals")?;
    Ok(Json(pending))
}

/// POST /api/approvals/{id}/approve
async fn approve(
    State(state): State<Arc<AppState>>,
    Governmental(approver): Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .repository
        .approve_registration(&id)
        .await
        .or_api("Failed to approve")?;
    info!(user_id = %user.id, approved_by = %approver.id, "Registration approved");
    Ok(message_response("Approved"))
}

/// DELETE /api/approvals/{id}
async fn reject(
    State(state): State<Arc<AppState>>,
    Governmental(approver): Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state
        .repository
        .reject_registration(&id)
        .await
        .or_api("Failed to delete")?
    {
        info!(pending_id = %id, rejected_by = %approver.id, "Registration rejected");
    }
    Ok(message_response("Deleted"))
}
