//! About and contact pages, and the public contact form.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{optional, required};
use crate::error::{ApiError, RepositoryResultExt};
use crate::model::{
    AboutUs, AboutUsContent, ContactInfo, ContactInfoContent, NewContactSubmission,
};
use crate::session::Governmental;
use crate::AppState;

const MISSING: &str = "All fields are required";

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/about", get(get_about).put(put_about))
        .route("/api/contact", get(get_contact).put(put_contact))
        .route("/api/contact/submit", post(submit_contact))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutRequest {
    title_en: Option<String>,
    title_bn: Option<String>,
    content_en: Option<String>,
    content_bn: Option<String>,
    mission_en: Option<String>,
    mission_bn: Option<String>,
    vision_en: Option<String>,
    vision_bn: Option<String>,
    values_en: Option<String>,
    values_bn: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactInfoRequest {
    title_en: Option<String>,
    title_bn: Option<String>,
    address_en: Option<String>,
    address_bn: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    office_hours_en: Option<String>,
    office_hours_bn: Option<String>,
    map_embed: Option<String>,
    social_media: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactSubmitRequest {
    name: Option<String>,
    email: Option<String>,
    subject: Option<String>,
    message: Option<String>,
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

async fn get_about(State(state): State<Arc<AppState>>) -> Result<Json<Option<AboutUs>>, ApiError> {
    let about = state
        .repository
        .get_about()
        .await
        .or_api("Failed to fetch about us")?;
    Ok(Json(about))
}

async fn put_about(
    State(state): State<Arc<AppState>>,
    Governmental(editor): Governmental,
    Json(body): Json<AboutRequest>,
) -> Result<Json<AboutUs>, ApiError> {
    let content = AboutUsContent {
        title_en: required(body.title_en, MISSING)?,
        title_bn: required(body.title_bn, MISSING)?,
        content_en: required(body.content_en, MISSING)?,
        content_bn: required(body.content_bn, MISSING)?,
        mission_en: required(body.mission_en, MISSING)?,
        mission_bn: required(body.mission_bn, MISSING)?,
        vision_en: required(body.vision_en, MISSING)?,
        vision_bn: required(body.vision_bn, MISSING)?,
        values_en: required(body.values_en, MISSING)?,
        values_bn: required(body.values_bn, MISSING)?,
        image_url: required(body.image_url, MISSING)?,
    };
    let about = state
        .repository
        .upsert_about(content)
        .await
        .or_api("Failed to update about us")?;
    info!(editor_id = %editor.id, "About page updated");
    Ok(Json(about))
}

async fn get_contact(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<ContactInfo>>, ApiError> {
    let contact = state
        .repository
        .get_contact_info()
        .await
        .or_api("Failed to fetch contact info")?;
    Ok(Json(contact))
}

async fn put_contact(
    State(state): State<Arc<AppState>>,
    Governmental(editor): Governmental,
    Json(body): Json<ContactInfoRequest>,
) -> Result<Json<ContactInfo>, ApiError> {
    let content = ContactInfoContent {
        title_en: required(body.title_en, MISSING)?,
        title_bn: required(body.title_bn, MISSING)?,
        address_en: required(body.address_en, MISSING)?,
        address_bn: required(body.address_bn, MISSING)?,
        phone: required(body.phone, MISSING)?,
        email: required(body.email, MISSING)?,
        website: required(body.website, MISSING)?,
        office_hours_en: required(body.office_hours_en, MISSING)?,
        office_hours_bn: required(body.office_hours_bn, MISSING)?,
        map_embed: optional(body.map_embed),
        social_media: optional(body.social_media),
    };
    let contact = state
        .repository
        .upsert_contact_info(content)
        .await
        .or_api("Failed to update contact info")?;
    info!(editor_id = %editor.id, "Contact page updated");
    Ok(Json(contact))
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactSubmitRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = required(body.name, MISSING)?;
    let email = required(body.email, MISSING)?;
    let subject = required(body.subject, MISSING)?;
    let message = required(body.message, MISSING)?;

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let submission = state
        .repository
        .submit_contact(NewContactSubmission {
            name: name.trim().to_string(),
            email,
            subject: subject.trim().to_string(),
            message: message.trim().to_string(),
        })
        .await
        .or_api("Failed to submit contact form")?;
    info!(submission_id = %submission.id, "Contact form submitted");
    Ok(Json(json!({
        "message": "Contact form submitted successfully",
        "submissionId": submission.id,
    })))
}
