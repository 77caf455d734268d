//! Events, per-user participation toggles, and the proposal queue.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{do_action, has_acted, ok_response, optional, required, undo_action};
use crate::action::{is_iso_date, ActionKind};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{ActionTarget, Event, EventWithProposer, NewEvent, PendingEvent};
use crate::session::{Governmental, MaybeSessionUser, SessionUser};
use crate::AppState;

const TOP_LIMIT: usize = 4;

const DEFAULT_EVENT_IMAGE: &str = "https://placehold.co/800x400/cccccc/000000?text=Event";

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/top", get(top_events))
        .route("/api/events/propose", post(propose_event))
        .route("/api/events/pending", get(list_pending))
        .route("/api/events/pending/{id}", delete(reject_pending))
        .route("/api/events/pending/{id}/approve", post(approve_pending))
        .route("/api/events/{id}", delete(delete_event))
        .route("/api/events/{id}/volunteer", post(volunteer))
        .route("/api/events/{id}/unvolunteer", post(unvolunteer))
        .route("/api/events/{id}/going", post(going))
        .route("/api/events/{id}/notgoing", post(not_going))
        .route("/api/events/{id}/helpful", post(helpful))
        .route("/api/events/{id}/unhelpful", post(unhelpful))
        .route("/api/events/{id}/status", get(event_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposeEventRequest {
    title_en: Option<String>,
    title_bn: Option<String>,
    description_en: Option<String>,
    description_bn: Option<String>,
    category: Option<String>,
    date: Option<String>,
    location: Option<String>,
    image_url: Option<String>,
    /// Number or numeric string.
    volunteers_needed: Option<Value>,
}

/// Leading integer of a number or string; anything else is zero.
fn parse_volunteers_needed(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<i64>().ok()
        }
        _ => None,
    };
    parsed.unwrap_or(0).max(0)
}

async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventWithProposer>>, ApiError> {
    let events = state
        .repository
        .list_events()
        .await
        .or_api("Failed to fetch events")?;
    Ok(Json(events))
}

async fn top_events(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .repository
        .top_events(TOP_LIMIT)
        .await
        .or_api("Failed to fetch top events")?;
    Ok(Json(events))
}

async fn volunteer(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(
        &state,
        ActionKind::EventVolunteer,
        &id,
        &user,
        "Failed to volunteer",
    )
    .await
}

async fn unvolunteer(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    undo_action(
        &state,
        ActionKind::EventVolunteer,
        &id,
        &user,
        "Failed to remove volunteer",
    )
    .await
}

async fn going(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(&state, ActionKind::EventGoing, &id, &user, "Failed to mark going").await
}

async fn not_going(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    undo_action(
        &state,
        ActionKind::EventGoing,
        &id,
        &user,
        "Failed to remove going",
    )
    .await
}

async fn helpful(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    do_action(
        &state,
        ActionKind::EventHelpful,
        &id,
        &user,
        "Failed to mark helpful",
    )
    .await
}

async fn unhelpful(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<ActionTarget>, ApiError> {
    undo_action(
        &state,
        ActionKind::EventHelpful,
        &id,
        &user,
        "Failed to remove helpful",
    )
    .await
}

async fn event_status(
    State(state): State<Arc<AppState>>,
    MaybeSessionUser(user): MaybeSessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    const CONTEXT: &str = "Failed to get status";
    let user = user.as_ref();
    let volunteered = has_acted(&state, ActionKind::EventVolunteer, &id, user, CONTEXT).await?;
    let going = has_acted(&state, ActionKind::EventGoing, &id, user, CONTEXT).await?;
    let helpful = has_acted(&state, ActionKind::EventHelpful, &id, user, CONTEXT).await?;
    Ok(Json(json!({
        "volunteered": volunteered,
        "going": going,
        "helpful": helpful,
    })))
}

async fn propose_event(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Json(body): Json<ProposeEventRequest>,
) -> Result<Json<Value>, ApiError> {
    const MISSING: &str = "All fields are required";

    let title_en = required(body.title_en, MISSING)?;
    let title_bn = required(body.title_bn, MISSING)?;
    let description_en = required(body.description_en, MISSING)?;
    let description_bn = required(body.description_bn, MISSING)?;
    let category = required(body.category, MISSING)?;
    let date = required(body.date, MISSING)?;
    let location = required(body.location, MISSING)?;
    if !is_iso_date(date.trim()) {
        return Err(ApiError::bad_request("Date must be in YYYY-MM-DD format"));
    }

    let proposal = NewEvent {
        title_bn,
        title_en,
        description_bn,
        description_en,
        category,
        date: date.trim().to_string(),
        location,
        image_url: optional(body.image_url).unwrap_or_else(|| DEFAULT_EVENT_IMAGE.to_string()),
        volunteers: parse_volunteers_needed(body.volunteers_needed.as_ref()),
        going: 0,
        helpful: 0,
    };
    let pending = state
        .repository
        .propose_event(proposal, &user.id)
        .await
        .or_api("Failed to submit event")?;
    info!(pending_id = %pending.id, proposer_id = %user.id, "Event proposed");
    Ok(Json(json!({
        "id": pending.id,
        "message": "Event submitted for approval",
    })))
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
) -> Result<Json<Vec<PendingEvent>>, ApiError> {
    let pending = state
        .repository
        .list_pending_events()
        .await
        .or_api("Failed to fetch pending events")?;
    Ok(Json(pending))
}

async fn approve_pending(
    State(state): State<Arc<AppState>>,
    Governmental(approver): Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = state
        .repository
        .approve_pending_event(&id)
        .await
        .or_api("Failed to approve event")?;
    info!(event_id = %event.id, approved_by = %approver.id, "Event approved");
    Ok(ok_response())
}

async fn reject_pending(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .reject_pending_event(&id)
        .await
        .or_api("Failed to delete pending event")?;
    Ok(ok_response())
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    _gov: Governmental,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .delete_event(&id)
        .await
        .or_api("Failed to delete event")?;
    Ok(ok_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volunteers_needed_parsing() {
        assert_eq!(parse_volunteers_needed(Some(&json!(12))), 12);
        assert_eq!(parse_volunteers_needed(Some(&json!("25"))), 25);
        assert_eq!(parse_volunteers_needed(Some(&json!(" 30 people"))), 30);
        assert_eq!(parse_volunteers_needed(Some(&json!("many"))), 0);
        assert_eq!(parse_volunteers_needed(Some(&json!(-4))), 0);
        assert_eq!(parse_volunteers_needed(Some(&json!(null))), 0);
        assert_eq!(parse_volunteers_needed(None), 0);
    }
}
