//! HTTP error type shared by every handler.
//!
//! Every failure reaches the client as `{"message": "..."}` with a status
//! code. Storage failures are logged here and replaced by a static message so
//! database details never leak into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repository::RepositoryError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Role check failure for governmental-only endpoints.
    pub fn forbidden() -> Self {
        ApiError::Forbidden("Forbidden")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Convert a repository error, using `context` as the client-facing
    /// message when the failure is not a domain outcome.
    pub fn from_repository(err: RepositoryError, context: &'static str) -> Self {
        match err {
            RepositoryError::NotFound(message) => ApiError::NotFound(message),
            RepositoryError::Conflict(message) => ApiError::Conflict(message),
            RepositoryError::Rejected(message) => ApiError::BadRequest(message),
            other => {
                error!("{}: {}", context, other);
                ApiError::Internal(context)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Extension for attaching the 500 message to repository results.
pub trait RepositoryResultExt<T> {
    fn or_api(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> RepositoryResultExt<T> for Result<T, RepositoryError> {
    fn or_api(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_repository(e, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err = ApiError::from_repository(
            RepositoryError::Conflict("Already voted".to_string()),
            "Failed to upvote project",
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Already voted");

        let err = ApiError::from_repository(
            RepositoryError::NotFound("Vote not found".to_string()),
            "Failed to remove vote",
        );
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from_repository(
            RepositoryError::Rejected("This event has ended.".to_string()),
            "Failed to volunteer for event",
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_errors_collapse_to_static_message() {
        let err = ApiError::from_repository(
            RepositoryError::storage("apply_action", "disk I/O error"),
            "Failed to upvote project",
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to upvote project");
    }

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(ApiError::forbidden().status_code(), StatusCode::FORBIDDEN);
    }
}
