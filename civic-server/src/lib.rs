pub mod action;
pub mod api;
pub mod auth;
pub mod certificate;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod seed;
pub mod session;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub use action::{ActionKind, TargetKind};
pub use error::ApiError;
pub use repository::{CivicRepository, RepositoryError, SqliteRepository};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Short revision identifier reported by `/health`.
pub fn get_server_version() -> String {
    // Packaged builds pin the hash through the environment.
    if let Some(git_hash) = option_env!("CIVIC_GIT_HASH") {
        if git_hash.len() >= 8 {
            git_hash[..8].to_string()
        } else {
            git_hash.to_string()
        }
    } else if let Some(git_hash) = built_info::GIT_COMMIT_HASH {
        if git_hash.len() >= 8 {
            git_hash[..8].to_string()
        } else {
            git_hash.to_string()
        }
    } else {
        built_info::PKG_VERSION.to_string()
    }
}

/// Shared state handed to every axum handler.
pub struct AppState {
    pub repository: Arc<dyn CivicRepository>,
    pub session_settings: session::SessionSettings,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn CivicRepository>,
        session_settings: session::SessionSettings,
    ) -> Self {
        Self {
            repository,
            session_settings,
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "civic-server",
        "version": get_server_version(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// `/health` plus every `/api` route, bound to `state`.
///
/// Transport layers (tracing, CORS) are added by the binary.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(api::api_router())
        .with_state(state)
}
