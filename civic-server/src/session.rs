//! Cookie sessions and the request extractors built on them.
//!
//! The client holds a random token in the `civic.sid` cookie; the database
//! holds only its SHA-256 digest and an expiry. Handlers take one of:
//!
//! - [`SessionUser`]: any signed-in user, 401 otherwise
//! - [`Governmental`]: signed-in governmental user, 401 / 403 otherwise
//! - [`MaybeSessionUser`]: never rejects for missing credentials

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};

use crate::auth::hash_session_token;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::error::ApiError;
use crate::model::{Role, User};
use crate::AppState;

pub const SESSION_COOKIE_NAME: &str = "civic.sid";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl SessionSettings {
    /// `ttl_hours` is clamped to `1..=MAX_SESSION_TTL_HOURS`.
    pub fn new(ttl_hours: i64, cookie_secure: bool) -> Self {
        let hours = ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
        Self {
            ttl: Duration::try_hours(hours).unwrap_or_else(|| Duration::hours(24 * 7)),
            cookie_secure,
        }
    }

    /// Expiry of a session issued at `now`, or `None` if it is not
    /// representable.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.ttl)
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME,
            token,
            self.ttl.num_seconds()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE_NAME
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(24 * 7, false)
    }
}

/// Extract the session token from the `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

async fn load_user(parts: &Parts, state: &Arc<AppState>) -> Result<Option<User>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    state
        .repository
        .session_user(&hash_session_token(&token), Utc::now())
        .await
        .map_err(|e| ApiError::from_repository(e, "Failed to load session"))
}

/// A signed-in user of any role.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        load_user(parts, state)
            .await?
            .map(SessionUser)
            .ok_or(ApiError::Unauthorized)
    }
}

/// A signed-in user with the governmental role.
#[derive(Debug, Clone)]
pub struct Governmental(pub User);

impl FromRequestParts<Arc<AppState>> for Governmental {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = load_user(parts, state)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        if user.role() != Role::Governmental {
            return Err(ApiError::forbidden());
        }
        Ok(Governmental(user))
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct MaybeSessionUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeSessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSessionUser(load_user(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        let settings = SessionSettings::new(9_999_999_999_999_999, false);
        assert_eq!(settings.ttl, Duration::hours(MAX_SESSION_TTL_HOURS));
        assert!(settings.expires_at(Utc::now()).is_some());

        let settings = SessionSettings::new(-5, false);
        assert_eq!(settings.ttl, Duration::hours(1));
    }

    #[test]
    fn test_unrepresentable_expiry_is_none() {
        let settings = SessionSettings {
            ttl: Duration::try_days(365 * 1_000_000).unwrap(),
            cookie_secure: false,
        };
        assert_eq!(settings.expires_at(Utc::now()), None);
    }

    #[test]
    fn test_session_token_from_single_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("civic.sid=abc123"));
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; civic.sid=tok; lang=bn"),
        );
        assert_eq!(session_token(&headers), Some("tok".to_string()));
    }

    #[test]
    fn test_session_token_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("civic.sid=second"));
        assert_eq!(session_token(&headers), Some("second".to_string()));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("civic.sid="));
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("civic.sidx=abc"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let settings = SessionSettings::new(1, false);
        let cookie = settings.session_cookie("tok");
        assert_eq!(
            cookie,
            "civic.sid=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600"
        );

        let secure = SessionSettings::new(1, true);
        assert!(secure.session_cookie("tok").ends_with("; Secure"));
        assert!(secure.clear_cookie().contains("Max-Age=0"));
    }
}
