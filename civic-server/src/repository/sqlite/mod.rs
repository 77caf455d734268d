//! SQLite implementation of `CivicRepository`.
//!
//! # Schema Versioning
//!
//! The database has a `schema_version` table that tracks the schema version.
//! When the schema needs to change, increment `CURRENT_SCHEMA_VERSION` and add
//! a migration in `run_migrations()`. Migrations run sequentially from the
//! current version to the target version.
//!
//! # Conventions
//!
//! - IDs are UUID v4 strings.
//! - Timestamps are unix milliseconds in `INTEGER` columns.
//! - Booleans are `INTEGER` 0/1.
//! - There are no foreign keys; deletes cascade explicitly inside a
//!   transaction.
//! - Lists ordered by creation time break ties on `rowid` so insertion order
//!   is stable within the same millisecond.

mod actions;
mod events;
mod notifications;
mod participation;
mod projects;
mod sessions;
mod site;
mod threads;
mod users;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::warn;

use super::{CivicRepository, RepositoryError};
use crate::action::ActionKind;
use crate::model::{
    AboutUs, AboutUsContent, ActionTarget, CommentWithAuthor, ContactInfo, ContactInfoContent,
    ContactSubmission, Event, EventWithProposer, FinishedEvent, NewAccount, NewContactSubmission,
    NewEvent, NewNotification, NewProject, NewThread, Notification, Participation,
    ParticipationDetails, PendingApproval, PendingEvent, Project, ProjectStatus, Thread,
    ThreadComment, ThreadSummary, User, UserNotification,
};

/// Current schema version. Increment this when making schema changes and add
/// corresponding migration logic in `run_migrations()`.
pub(crate) const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed civic repository.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous rusqlite operations
/// without blocking the async runtime.
pub struct SqliteRepository {
    /// Exposed as `pub(crate)` so tests can adjust rows directly.
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Create a new SQLite repository at the given path.
    ///
    /// Creates the database file and schema if they don't exist, and runs any
    /// pending migrations on an older schema.
    ///
    /// # Durability
    ///
    /// - `journal_mode = WAL` for concurrent readers during writes
    /// - `synchronous = NORMAL`, safe under WAL
    /// - `busy_timeout = 5000ms` to wait out competing writers such as the CLI
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy();
        let is_in_memory = path_str == ":memory:";

        if !is_in_memory && !path_str.is_empty() {
            if let Some(parent) = path_ref.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RepositoryError::storage(
                            "create database directory",
                            format!("{}: {}", parent.display(), e),
                        )
                    })?;
                }
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;

        // The database holds password hashes and session digests.
        #[cfg(unix)]
        if !is_in_memory && !path_str.is_empty() {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(path_ref, permissions) {
                warn!(
                    "Failed to set restrictive permissions on database file: {}",
                    e
                );
            }
        }

        // SQLite silently keeps DELETE mode on filesystems without shared
        // memory support. In-memory databases report "memory".
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| RepositoryError::storage("set journal_mode", e.to_string()))?;

        let journal_mode_ok = journal_mode.eq_ignore_ascii_case("wal")
            || (is_in_memory && journal_mode.eq_ignore_ascii_case("memory"));

        if !journal_mode_ok {
            return Err(RepositoryError::storage(
                "configure journal_mode",
                format!(
                    "Failed to enable WAL mode: SQLite returned '{}' instead of 'wal'",
                    journal_mode
                ),
            ));
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            "#,
        )
        .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| RepositoryError::storage("create schema_version table", e.to_string()))?;

        // 0 means a fresh database.
        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| RepositoryError::storage("get schema version", e.to_string()))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run migrations from `from_version` to `CURRENT_SCHEMA_VERSION`.
    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}. \
                     Please upgrade the application.",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'citizen',
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    id_type TEXT NOT NULL,
                    id_number TEXT NOT NULL UNIQUE,
                    building TEXT NOT NULL,
                    floor TEXT,
                    street TEXT NOT NULL,
                    thana TEXT NOT NULL,
                    city TEXT NOT NULL,
                    postal_code TEXT NOT NULL,
                    country TEXT NOT NULL,
                    mobile TEXT NOT NULL UNIQUE,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS pending_approvals (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'citizen',
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    id_type TEXT NOT NULL,
                    id_number TEXT NOT NULL,
                    building TEXT NOT NULL,
                    floor TEXT,
                    street TEXT NOT NULL,
                    thana TEXT NOT NULL,
                    city TEXT NOT NULL,
                    postal_code TEXT NOT NULL,
                    country TEXT NOT NULL,
                    mobile TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    token_hash TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    expires_at INTEGER NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_sessions_expires_at
                    ON sessions(expires_at);

                CREATE TABLE IF NOT EXISTS projects (
                    id TEXT PRIMARY KEY,
                    title_bn TEXT NOT NULL,
                    title_en TEXT NOT NULL,
                    description_bn TEXT NOT NULL,
                    description_en TEXT NOT NULL,
                    category TEXT NOT NULL,
                    budget TEXT NOT NULL,
                    status TEXT NOT NULL,
                    image_url TEXT NOT NULL,
                    upvotes INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS events (
                    id TEXT PRIMARY KEY,
                    title_bn TEXT NOT NULL,
                    title_en TEXT NOT NULL,
                    description_bn TEXT NOT NULL,
                    description_en TEXT NOT NULL,
                    category TEXT NOT NULL,
                    date TEXT NOT NULL,
                    location TEXT NOT NULL,
                    image_url TEXT NOT NULL,
                    volunteers INTEGER NOT NULL DEFAULT 0,
                    going INTEGER NOT NULL DEFAULT 0,
                    helpful INTEGER NOT NULL DEFAULT 0,
                    proposer_id TEXT,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS pending_events (
                    id TEXT PRIMARY KEY,
                    title_bn TEXT NOT NULL,
                    title_en TEXT NOT NULL,
                    description_bn TEXT NOT NULL,
                    description_en TEXT NOT NULL,
                    category TEXT NOT NULL,
                    date TEXT NOT NULL,
                    location TEXT NOT NULL,
                    image_url TEXT NOT NULL,
                    volunteers INTEGER NOT NULL DEFAULT 0,
                    proposer_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS threads (
                    id TEXT PRIMARY KEY,
                    title_bn TEXT NOT NULL,
                    title_en TEXT NOT NULL,
                    content_bn TEXT NOT NULL,
                    content_en TEXT NOT NULL,
                    category TEXT NOT NULL,
                    author_id TEXT NOT NULL,
                    likes INTEGER NOT NULL DEFAULT 0,
                    pinned INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS thread_comments (
                    id TEXT PRIMARY KEY,
                    thread_id TEXT NOT NULL,
                    author_id TEXT NOT NULL,
                    text TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_thread_comments_thread
                    ON thread_comments(thread_id, created_at DESC);

                CREATE TABLE IF NOT EXISTS action_records (
                    id TEXT PRIMARY KEY,
                    action_kind TEXT NOT NULL,
                    target_id TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    UNIQUE (action_kind, target_id, user_id)
                );
                CREATE INDEX IF NOT EXISTS idx_action_records_target
                    ON action_records(target_id);

                CREATE TABLE IF NOT EXISTS event_participation (
                    id TEXT PRIMARY KEY,
                    event_id TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    participation_type TEXT NOT NULL,
                    certificate_generated INTEGER NOT NULL DEFAULT 0,
                    certificate_url TEXT,
                    created_at INTEGER NOT NULL,
                    UNIQUE (event_id, user_id, participation_type)
                );
                CREATE INDEX IF NOT EXISTS idx_event_participation_user
                    ON event_participation(user_id);

                CREATE TABLE IF NOT EXISTS notifications (
                    id TEXT PRIMARY KEY,
                    title_bn TEXT NOT NULL,
                    title_en TEXT NOT NULL,
                    message_bn TEXT NOT NULL,
                    message_en TEXT NOT NULL,
                    author_id TEXT NOT NULL,
                    target_type TEXT NOT NULL,
                    target_thana TEXT,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    created_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS notification_reads (
                    id TEXT PRIMARY KEY,
                    notification_id TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    read_at INTEGER NOT NULL,
                    UNIQUE (notification_id, user_id)
                );

                CREATE TABLE IF NOT EXISTS about_us (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    title_en TEXT NOT NULL,
                    title_bn TEXT NOT NULL,
                    content_en TEXT NOT NULL,
                    content_bn TEXT NOT NULL,
                    mission_en TEXT NOT NULL,
                    mission_bn TEXT NOT NULL,
                    vision_en TEXT NOT NULL,
                    vision_bn TEXT NOT NULL,
                    values_en TEXT NOT NULL,
                    values_bn TEXT NOT NULL,
                    image_url TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS contact_info (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    title_en TEXT NOT NULL,
                    title_bn TEXT NOT NULL,
                    address_en TEXT NOT NULL,
                    address_bn TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    email TEXT NOT NULL,
                    website TEXT NOT NULL,
                    office_hours_en TEXT NOT NULL,
                    office_hours_bn TEXT NOT NULL,
                    map_embed TEXT,
                    social_media TEXT,
                    updated_at INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS contact_submissions (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    subject TEXT NOT NULL,
                    message TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'new',
                    created_at INTEGER NOT NULL
                );
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v1", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| RepositoryError::storage("update schema version", e.to_string()))?;

        Ok(())
    }

    /// Create a new in-memory SQLite repository (for tests and dry runs).
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }

    /// Run `f` against the connection on the blocking thread pool.
    pub(super) async fn run<T, F>(
        &self,
        operation: &'static str,
        f: F,
    ) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| RepositoryError::storage(operation, "connection mutex poisoned"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::storage(operation, e.to_string()))?
    }
}

// =============================================================================
// Row and value helpers
// =============================================================================

/// Map a rusqlite error for `operation`. Unparseable stored values become
/// `Corruption`; everything else is `Storage`.
pub(super) fn sql_err(operation: &'static str) -> impl Fn(rusqlite::Error) -> RepositoryError {
    move |e| match e {
        rusqlite::Error::FromSqlConversionFailure(..) => RepositoryError::corruption("column value"),
        other => RepositoryError::storage(operation, other.to_string()),
    }
}

pub(super) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

/// Prefix each column in a comma-separated list with `alias.`.
pub(super) fn qualify(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|column| format!("{}.{}", alias, column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(super) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(super) fn now_millis() -> i64 {
    to_millis(Utc::now())
}

/// Read a millisecond timestamp column.
pub(super) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {} out of range", millis).into(),
        )
    })
}

/// Read a text column holding one of an enum's string forms.
pub(super) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.get(idx)?;
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Convert a usize limit to i64 for a SQLite LIMIT clause.
pub(super) fn usize_to_i64_limit(
    limit: usize,
    operation: &'static str,
) -> Result<i64, RepositoryError> {
    i64::try_from(limit).map_err(|_| {
        RepositoryError::storage(
            operation,
            format!("limit {} exceeds maximum storable value ({})", limit, i64::MAX),
        )
    })
}

// =============================================================================
// CivicRepository trait implementation
// =============================================================================

#[async_trait]
impl CivicRepository for SqliteRepository {
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.get_user_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.get_user_by_username_impl(username).await
    }

    async fn create_user(&self, account: NewAccount) -> Result<User, RepositoryError> {
        self.create_user_impl(account).await
    }

    async fn submit_registration(
        &self,
        account: NewAccount,
    ) -> Result<PendingApproval, RepositoryError> {
        self.submit_registration_impl(account).await
    }

    async fn list_pending_approvals(&self) -> Result<Vec<PendingApproval>, RepositoryError> {
        self.list_pending_approvals_impl().await
    }

    async fn approve_registration(&self, id: &str) -> Result<User, RepositoryError> {
        self.approve_registration_impl(id).await
    }

    async fn reject_registration(&self, id: &str) -> Result<bool, RepositoryError> {
        self.reject_registration_impl(id).await
    }

    // =========================================================================
    // Sessions - delegated to sessions module
    // =========================================================================

    async fn create_session(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.create_session_impl(token_hash, user_id, expires_at)
            .await
    }

    async fn session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        self.session_user_impl(token_hash, now).await
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepositoryError> {
        self.delete_session_impl(token_hash).await
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        self.purge_expired_sessions_impl(now).await
    }

    // =========================================================================
    // Projects - delegated to projects module
    // =========================================================================

    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        self.list_projects_impl().await
    }

    async fn top_projects(&self, limit: usize) -> Result<Vec<Project>, RepositoryError> {
        self.top_projects_impl(limit).await
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, RepositoryError> {
        self.get_project_impl(id).await
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, RepositoryError> {
        self.create_project_impl(project).await
    }

    async fn delete_project(&self, id: &str) -> Result<bool, RepositoryError> {
        self.delete_project_impl(id).await
    }

    async fn update_project_status(
        &self,
        id: &str,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError> {
        self.update_project_status_impl(id, status).await
    }

    // =========================================================================
    // Action counters - delegated to actions module
    // =========================================================================

    async fn apply_action(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
        today: &str,
    ) -> Result<ActionTarget, RepositoryError> {
        self.apply_action_impl(kind, target_id, user_id, today)
            .await
    }

    async fn revoke_action(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<ActionTarget, RepositoryError> {
        self.revoke_action_impl(kind, target_id, user_id).await
    }

    async fn has_acted(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        self.has_acted_impl(kind, target_id, user_id).await
    }

    async fn count_actions(
        &self,
        kind: ActionKind,
        target_id: &str,
    ) -> Result<i64, RepositoryError> {
        self.count_actions_impl(kind, target_id).await
    }

    // =========================================================================
    // Events - delegated to events module
    // =========================================================================

    async fn list_events(&self) -> Result<Vec<EventWithProposer>, RepositoryError> {
        self.list_events_impl().await
    }

    async fn top_events(&self, limit: usize) -> Result<Vec<Event>, RepositoryError> {
        self.top_events_impl(limit).await
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, RepositoryError> {
        self.get_event_impl(id).await
    }

    async fn create_event(
        &self,
        event: NewEvent,
        proposer_id: Option<&str>,
    ) -> Result<Event, RepositoryError> {
        self.create_event_impl(event, proposer_id).await
    }

    async fn delete_event(&self, id: &str) -> Result<bool, RepositoryError> {
        self.delete_event_impl(id).await
    }

    async fn propose_event(
        &self,
        event: NewEvent,
        proposer_id: &str,
    ) -> Result<PendingEvent, RepositoryError> {
        self.propose_event_impl(event, proposer_id).await
    }

    async fn list_pending_events(&self) -> Result<Vec<PendingEvent>, RepositoryError> {
        self.list_pending_events_impl().await
    }

    async fn approve_pending_event(&self, id: &str) -> Result<Event, RepositoryError> {
        self.approve_pending_event_impl(id).await
    }

    async fn reject_pending_event(&self, id: &str) -> Result<bool, RepositoryError> {
        self.reject_pending_event_impl(id).await
    }

    // =========================================================================
    // Threads - delegated to threads module
    // =========================================================================

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, RepositoryError> {
        self.list_threads_impl().await
    }

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>, RepositoryError> {
        self.get_thread_impl(id).await
    }

    async fn create_thread(
        &self,
        thread: NewThread,
        author_id: &str,
    ) -> Result<Thread, RepositoryError> {
        self.create_thread_impl(thread, author_id).await
    }

    async fn list_comments(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        self.list_comments_impl(thread_id).await
    }

    async fn add_comment(
        &self,
        thread_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<ThreadComment, RepositoryError> {
        self.add_comment_impl(thread_id, author_id, text).await
    }

    async fn set_thread_pinned(
        &self,
        id: &str,
        pinned: bool,
    ) -> Result<Option<Thread>, RepositoryError> {
        self.set_thread_pinned_impl(id, pinned).await
    }

    async fn delete_thread(&self, id: &str) -> Result<bool, RepositoryError> {
        self.delete_thread_impl(id).await
    }

    // =========================================================================
    // Notifications - delegated to notifications module
    // =========================================================================

    async fn notifications_for_user(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<Vec<UserNotification>, RepositoryError> {
        self.notifications_for_user_impl(user_id, thana).await
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, RepositoryError> {
        self.list_notifications_impl().await
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
        author_id: &str,
    ) -> Result<Notification, RepositoryError> {
        self.create_notification_impl(notification, author_id).await
    }

    async fn mark_notification_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        self.mark_notification_read_impl(notification_id, user_id)
            .await
    }

    async fn mark_all_notifications_read(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<usize, RepositoryError> {
        self.mark_all_notifications_read_impl(user_id, thana).await
    }

    async fn deactivate_notification(&self, id: &str) -> Result<bool, RepositoryError> {
        self.deactivate_notification_impl(id).await
    }

    // =========================================================================
    // Site content - delegated to site module
    // =========================================================================

    async fn get_about(&self) -> Result<Option<AboutUs>, RepositoryError> {
        self.get_about_impl().await
    }

    async fn upsert_about(&self, content: AboutUsContent) -> Result<AboutUs, RepositoryError> {
        self.upsert_about_impl(content).await
    }

    async fn get_contact_info(&self) -> Result<Option<ContactInfo>, RepositoryError> {
        self.get_contact_info_impl().await
    }

    async fn upsert_contact_info(
        &self,
        content: ContactInfoContent,
    ) -> Result<ContactInfo, RepositoryError> {
        self.upsert_contact_info_impl(content).await
    }

    async fn submit_contact(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        self.submit_contact_impl(submission).await
    }

    // =========================================================================
    // Participation - delegated to participation module
    // =========================================================================

    async fn finished_participations(
        &self,
        user_id: &str,
        today: &str,
    ) -> Result<Vec<FinishedEvent>, RepositoryError> {
        self.finished_participations_impl(user_id, today).await
    }

    async fn get_participation_details(
        &self,
        id: &str,
    ) -> Result<Option<ParticipationDetails>, RepositoryError> {
        self.get_participation_details_impl(id).await
    }

    async fn mark_certificate_generated(
        &self,
        id: &str,
        certificate_url: &str,
    ) -> Result<Participation, RepositoryError> {
        self.mark_certificate_generated_impl(id, certificate_url)
            .await
    }
}
