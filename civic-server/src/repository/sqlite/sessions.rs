//! Login sessions keyed by the SHA-256 digest of the cookie token.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::super::RepositoryError;
use super::users::{user_from_row, user_select};
use super::{now_millis, sql_err, to_millis, SqliteRepository};
use crate::model::User;

impl SqliteRepository {
    pub(super) async fn create_session_impl(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let token_hash = token_hash.to_string();
        let user_id = user_id.to_string();
        let expires_at = to_millis(expires_at);
        self.run("create_session", move |conn| {
            conn.execute(
                "INSERT INTO sessions (token_hash, user_id, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token_hash, user_id, expires_at, now_millis()],
            )
            .map_err(sql_err("create_session"))?;
            Ok(())
        })
        .await
    }

    pub(super) async fn session_user_impl(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let token_hash = token_hash.to_string();
        let now = to_millis(now);
        self.run("session_user", move |conn| {
            let session: Option<(String, i64)> = conn
                .query_row(
                    "SELECT user_id, expires_at FROM sessions WHERE token_hash = ?1",
                    params![token_hash],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(sql_err("session_user"))?;

            let Some((user_id, expires_at)) = session else {
                return Ok(None);
            };

            if expires_at <= now {
                conn.execute(
                    "DELETE FROM sessions WHERE token_hash = ?1",
                    params![token_hash],
                )
                .map_err(sql_err("session_user"))?;
                return Ok(None);
            }

            conn.query_row(
                &format!("SELECT {} FROM users u WHERE u.id = ?1", user_select("u")),
                params![user_id],
                |row| user_from_row(row, 0),
            )
            .optional()
            .map_err(sql_err("session_user"))
        })
        .await
    }

    pub(super) async fn delete_session_impl(&self, token_hash: &str) -> Result<(), RepositoryError> {
        let token_hash = token_hash.to_string();
        self.run("delete_session", move |conn| {
            conn.execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )
            .map_err(sql_err("delete_session"))?;
            Ok(())
        })
        .await
    }

    pub(super) async fn purge_expired_sessions_impl(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let now = to_millis(now);
        self.run("purge_expired_sessions", move |conn| {
            conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])
                .map_err(sql_err("purge_expired_sessions"))
        })
        .await
    }
}
