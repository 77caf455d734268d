//! Repository abstraction for the civic platform's persistent state.
//!
//! This module defines the `CivicRepository` trait that the HTTP layer and
//! the CLI talk to. `SqliteRepository` is the only backend; the trait keeps
//! handlers independent of rusqlite and lets tests swap in a fresh
//! in-memory database per case.

mod sqlite;

pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::action::ActionKind;
use crate::model::{
    AboutUs, AboutUsContent, ActionTarget, CommentWithAuthor, ContactInfo, ContactInfoContent,
    ContactSubmission, Event, EventWithProposer, FinishedEvent, NewAccount, NewContactSubmission,
    NewEvent, NewNotification, NewProject, NewThread, Notification, Participation,
    ParticipationDetails, PendingApproval, PendingEvent, Project, ProjectStatus, Thread,
    ThreadComment, ThreadSummary, User, UserNotification,
};

/// Errors surfaced by repository operations.
///
/// `NotFound`, `Conflict` and `Rejected` are domain outcomes whose message is
/// safe to show to the client. `Storage` and `Corruption` are failures.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    #[error("corrupt {what} in database")]
    Corruption { what: &'static str },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Rejected(String),
}

impl RepositoryError {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        RepositoryError::Storage {
            operation,
            message: message.into(),
        }
    }

    pub fn corruption(what: &'static str) -> Self {
        RepositoryError::Corruption { what }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RepositoryError::Conflict(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        RepositoryError::Rejected(message.into())
    }
}

/// Repository trait for the platform's users, content and action counters.
///
/// Methods returning `bool` report whether a row was affected; methods
/// returning `Option` yield `None` for a missing row. Operations that can
/// only succeed against an existing row return `RepositoryError::NotFound`
/// instead.
#[async_trait]
pub trait CivicRepository: Send + Sync {
    // =========================================================================
    // Accounts and registration
    // =========================================================================

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Create an active account directly, bypassing approval.
    ///
    /// Fails with `Conflict` when the email, mobile or ID number is taken.
    async fn create_user(&self, account: NewAccount) -> Result<User, RepositoryError>;

    /// Queue a registration for governmental approval.
    ///
    /// Uniqueness of email, mobile and ID number is checked against both
    /// accounts and pending registrations in the same transaction as the
    /// insert.
    async fn submit_registration(
        &self,
        account: NewAccount,
    ) -> Result<PendingApproval, RepositoryError>;

    /// Pending registrations, oldest first.
    async fn list_pending_approvals(&self) -> Result<Vec<PendingApproval>, RepositoryError>;

    /// Move a pending registration into the accounts table.
    async fn approve_registration(&self, id: &str) -> Result<User, RepositoryError>;

    async fn reject_registration(&self, id: &str) -> Result<bool, RepositoryError>;

    // =========================================================================
    // Sessions
    // =========================================================================

    async fn create_session(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Resolve a session to its user. Expired sessions resolve to `None`
    /// and are deleted.
    async fn session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepositoryError>;

    /// Delete all sessions expired as of `now`, returning the count.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError>;

    // =========================================================================
    // Projects
    // =========================================================================

    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;

    /// Most upvoted projects, ties broken by recency.
    async fn top_projects(&self, limit: usize) -> Result<Vec<Project>, RepositoryError>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>, RepositoryError>;

    async fn create_project(&self, project: NewProject) -> Result<Project, RepositoryError>;

    /// Delete a project together with its action records.
    async fn delete_project(&self, id: &str) -> Result<bool, RepositoryError>;

    async fn update_project_status(
        &self,
        id: &str,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError>;

    // =========================================================================
    // Action counters
    // =========================================================================

    /// Record that `user_id` performed `kind` on `target_id` and move the
    /// counter up by one, atomically.
    ///
    /// `today` is `YYYY-MM-DD` and gates date-restricted event actions.
    async fn apply_action(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
        today: &str,
    ) -> Result<ActionTarget, RepositoryError>;

    /// Remove the record for `(kind, target_id, user_id)` and move the
    /// counter down by one, atomically.
    async fn revoke_action(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<ActionTarget, RepositoryError>;

    async fn has_acted(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError>;

    /// Number of live action records of `kind` on `target_id`.
    async fn count_actions(&self, kind: ActionKind, target_id: &str)
        -> Result<i64, RepositoryError>;

    // =========================================================================
    // Events
    // =========================================================================

    /// All events, newest first, with the proposer's display name.
    async fn list_events(&self) -> Result<Vec<EventWithProposer>, RepositoryError>;

    /// Events with the most helpful marks.
    async fn top_events(&self, limit: usize) -> Result<Vec<Event>, RepositoryError>;

    async fn get_event(&self, id: &str) -> Result<Option<Event>, RepositoryError>;

    async fn create_event(
        &self,
        event: NewEvent,
        proposer_id: Option<&str>,
    ) -> Result<Event, RepositoryError>;

    /// Delete an event with its action records and participations.
    async fn delete_event(&self, id: &str) -> Result<bool, RepositoryError>;

    async fn propose_event(
        &self,
        event: NewEvent,
        proposer_id: &str,
    ) -> Result<PendingEvent, RepositoryError>;

    /// Pending proposals, newest first.
    async fn list_pending_events(&self) -> Result<Vec<PendingEvent>, RepositoryError>;

    /// Publish a pending proposal as an event.
    async fn approve_pending_event(&self, id: &str) -> Result<Event, RepositoryError>;

    async fn reject_pending_event(&self, id: &str) -> Result<bool, RepositoryError>;

    // =========================================================================
    // Threads
    // =========================================================================

    /// Pinned threads first, then newest.
    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, RepositoryError>;

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>, RepositoryError>;

    async fn create_thread(
        &self,
        thread: NewThread,
        author_id: &str,
    ) -> Result<Thread, RepositoryError>;

    /// Comments on a thread, newest first.
    async fn list_comments(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError>;

    async fn add_comment(
        &self,
        thread_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<ThreadComment, RepositoryError>;

    async fn set_thread_pinned(
        &self,
        id: &str,
        pinned: bool,
    ) -> Result<Option<Thread>, RepositoryError>;

    /// Delete a thread with its comments and likes.
    async fn delete_thread(&self, id: &str) -> Result<bool, RepositoryError>;

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Active notifications visible in `thana`, newest first, with read
    /// state for `user_id`.
    async fn notifications_for_user(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<Vec<UserNotification>, RepositoryError>;

    /// Every notification, newest first.
    async fn list_notifications(&self) -> Result<Vec<Notification>, RepositoryError>;

    async fn create_notification(
        &self,
        notification: NewNotification,
        author_id: &str,
    ) -> Result<Notification, RepositoryError>;

    /// Record a read receipt. Returns `false` if one already existed.
    async fn mark_notification_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError>;

    /// Record read receipts for every notification visible in `thana`.
    /// Returns the number of receipts added.
    async fn mark_all_notifications_read(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<usize, RepositoryError>;

    async fn deactivate_notification(&self, id: &str) -> Result<bool, RepositoryError>;

    // =========================================================================
    // Site content
    // =========================================================================

    async fn get_about(&self) -> Result<Option<AboutUs>, RepositoryError>;

    async fn upsert_about(&self, content: AboutUsContent) -> Result<AboutUs, RepositoryError>;

    async fn get_contact_info(&self) -> Result<Option<ContactInfo>, RepositoryError>;

    async fn upsert_contact_info(
        &self,
        content: ContactInfoContent,
    ) -> Result<ContactInfo, RepositoryError>;

    async fn submit_contact(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, RepositoryError>;

    // =========================================================================
    // Participation and certificates
    // =========================================================================

    /// The user's participations in events dated before `today`, latest
    /// event date first.
    async fn finished_participations(
        &self,
        user_id: &str,
        today: &str,
    ) -> Result<Vec<FinishedEvent>, RepositoryError>;

    async fn get_participation_details(
        &self,
        id: &str,
    ) -> Result<Option<ParticipationDetails>, RepositoryError>;

    /// Flag a participation's certificate as generated and store its URL.
    async fn mark_certificate_generated(
        &self,
        id: &str,
        certificate_url: &str,
    ) -> Result<Participation, RepositoryError>;
}
