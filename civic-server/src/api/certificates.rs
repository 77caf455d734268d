//! Finished events and participation certificates.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::action::{is_event_finished, today_iso};
use crate::certificate::{certificate_filename, certificate_url, render_certificate};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{FinishedEvent, ParticipationDetails, User};
use crate::session::SessionUser;
use crate::AppState;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/finished-events", get(finished_events))
        .route(
            "/api/user/generate-certificate/{id}",
            post(generate_certificate),
        )
        .route("/api/certificates/{file}", get(download_certificate))
}

/// Load a participation and check it belongs to `user`.
async fn owned_participation(
    state: &AppState,
    id: &str,
    user: &User,
    context: &'static str,
) -> Result<ParticipationDetails, ApiError> {
    let details = state
        .repository
        .get_participation_details(id)
        .await
        .or_api(context)?
        .ok_or_else(|| ApiError::not_found("Participation not found"))?;
    if details.participation.user_id != user.id {
        return Err(ApiError::Forbidden("Access denied"));
    }
    Ok(details)
}

async fn finished_events(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Json<Vec<FinishedEvent>>, ApiError> {
    let finished = state
        .repository
        .finished_participations(&user.id, &today_iso())
        .await
        .or_api("Failed to fetch finished events")?;
    Ok(Json(finished))
}

async fn generate_certificate(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    const CONTEXT: &str = "Failed to generate certificate";

    let details = owned_participation(&state, &id, &user, CONTEXT).await?;
    if !is_event_finished(&details.event.date, &today_iso()) {
        return Err(ApiError::bad_request(
            "Certificates are available after the event has finished",
        ));
    }

    let participation = &details.participation;
    if participation.certificate_generated {
        let url = participation
            .certificate_url
            .clone()
            .unwrap_or_else(|| certificate_url(&participation.id));
        return Ok(Json(json!({
            "message": "Certificate already generated",
            "certificateUrl": url,
        })));
    }

    let url = certificate_url(&participation.id);
    state
        .repository
        .mark_certificate_generated(&participation.id, &url)
        .await
        .or_api(CONTEXT)?;
    info!(
        participation_id = %participation.id,
        event_id = %details.event.id,
        user_id = %user.id,
        "Certificate generated"
    );
    Ok(Json(json!({
        "message": "Certificate generated successfully",
        "certificateUrl": url,
    })))
}

async fn download_certificate(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = file.strip_suffix(".svg").unwrap_or(&file);
    let details = owned_participation(&state, id, &user, "Failed to fetch certificate").await?;
    if !details.participation.certificate_generated {
        return Err(ApiError::not_found("Certificate not generated"));
    }

    let svg = render_certificate(&details, &today_iso());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        certificate_filename(&details.event.title_en)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        svg,
    ))
}
