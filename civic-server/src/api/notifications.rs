//! Thana-targeted and countrywide notifications.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{message_response, optional, required};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{NewNotification, Notification, TargetType, UserNotification};
use crate::session::{Governmental, SessionUser};
use crate::AppState;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/notifications",
            get(list_for_user).post(create_notification),
        )
        .route("/api/notifications/admin", get(list_all))
        .route("/api/notifications/read-all", post(mark_all_read))
        .route("/api/notifications/{id}/read", post(mark_read))
        .route("/api/notifications/{id}/deactivate", patch(deactivate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNotificationRequest {
    title_bn: Option<String>,
    title_en: Option<String>,
    message_bn: Option<String>,
    message_en: Option<String>,
    target_type: Option<String>,
    target_thana: Option<String>,
}

/// Validate a notification body into its domain form.
fn new_notification(body: CreateNotificationRequest) -> Result<NewNotification, ApiError> {
    const MISSING: &str = "Missing required fields";

    let title_bn = required(body.title_bn, MISSING)?;
    let title_en = required(body.title_en, MISSING)?;
    let message_bn = required(body.message_bn, MISSING)?;
    let message_en = required(body.message_en, MISSING)?;
    let target_type = required(body.target_type, MISSING)?
        .parse::<TargetType>()
        .map_err(|_| ApiError::bad_request("Invalid target type"))?;
    let target_thana = match target_type {
        TargetType::Thana => Some(optional(body.target_thana).ok_or_else(|| {
            ApiError::bad_request("Target thana required for thana-specific notifications")
        })?),
        TargetType::Countrywide => None,
    };

    Ok(NewNotification {
        title_bn,
        title_en,
        message_bn,
        message_en,
        target_type,
        target_thana,
    })
}

/// GET /api/notifications: what the caller's thana can see, with read state.
async fn list_for_user(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Json<Vec<UserNotification>>, ApiError> {
    let notifications = state
        .repository
        .notifications_for_user(&user.id, &user.profile.thana)
        .await
        .or_api("Failed to fetch notifications")?;
    Ok(Json(notifications))
}

async fn list_all(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .repository
        .list_notifications()
        .await
        .or_api("Failed to fetch notifications")?;
    Ok(Json(notifications))
}

async fn create_notification(
    State(state): State<Arc<AppState>>,
    Governmental(author): Governmental,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<Json<Notification>, ApiError> {
    let notification = new_notification(body)?;
    let notification = state
        .repository
        .create_notification(notification, &author.id)
        .await
        .or_api("Failed to create notification")?;
    info!(
        notification_id = %notification.id,
        target = notification.target_type.as_str(),
        "Notification published"
    );
    Ok(Json(notification))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let newly_read = state
        .repository
        .mark_notification_read(&id, &user.id)
        .await
        .or_api("Failed to mark as read")?;
    Ok(message_response(if newly_read {
        "Marked as read"
    } else {
        "Already read"
    }))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .mark_all_notifications_read(&user.id, &user.profile.thana)
        .await
        .or_api("Failed to mark all as read")?;
    Ok(message_response("All notifications marked as read"))
}

async fn deactivate(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .deactivate_notification(&id)
        .await
        .or_api("Failed to deactivate notification")?;
    Ok(message_response("Notification deactivated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(target_type: &str, target_thana: Option<&str>) -> CreateNotificationRequest {
        CreateNotificationRequest {
            title_bn: Some("শিরোনাম".to_string()),
            title_en: Some("Title".to_string()),
            message_bn: Some("বার্তা".to_string()),
            message_en: Some("Message".to_string()),
            target_type: Some(target_type.to_string()),
            target_thana: target_thana.map(str::to_string),
        }
    }

    #[test]
    fn test_thana_target_requires_a_thana() {
        let err = new_notification(body("thana", None)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Target thana required for thana-specific notifications"
        );
        let ok = new_notification(body("thana", Some("Mirpur"))).unwrap();
        assert_eq!(ok.target_thana.as_deref(), Some("Mirpur"));
    }

    #[test]
    fn test_countrywide_drops_thana() {
        let ok = new_notification(body("countrywide", Some("Mirpur"))).unwrap();
        assert_eq!(ok.target_type, TargetType::Countrywide);
        assert!(ok.target_thana.is_none());
    }

    #[test]
    fn test_unknown_target_type_is_rejected() {
        assert!(matches!(
            new_notification(body("district", None)),
            Err(ApiError::BadRequest(_))
        ));
    }
}
