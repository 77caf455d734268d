//! Domain types for the civic platform.
//!
//! These are the shapes the API serializes (camelCase JSON) and the
//! repository reads and writes. Bilingual text is carried as paired
//! `*_bn` / `*_en` fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen,
    Governmental,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Governmental => "governmental",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "governmental" => Ok(Role::Governmental),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Personal details captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    /// Email address, used as the login name.
    pub username: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    /// `nid` or `birthCert`.
    pub id_type: String,
    pub id_number: String,
    pub building: String,
    pub floor: Option<String>,
    pub street: String,
    pub thana: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub mobile: String,
}

/// A profile plus its scrypt hash, ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub profile: AccountProfile,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub profile: AccountProfile,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// "First Last", falling back to the username when both names are blank.
    pub fn display_name(&self) -> String {
        display_name(
            &self.profile.first_name,
            &self.profile.last_name,
            &self.profile.username,
        )
    }
}

pub(crate) fn display_name(first: &str, last: &str, username: &str) -> String {
    let full = format!("{} {}", first, last);
    let trimmed = full.trim();
    if trimmed.is_empty() {
        username.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A registration waiting for governmental approval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    pub id: String,
    #[serde(flatten)]
    pub profile: AccountProfile,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Author details attached to threads and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Projects and polls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    Active,
    Implementation,
    Completed,
    #[serde(rename = "Partially Active")]
    PartiallyActive,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::Active,
        ProjectStatus::Implementation,
        ProjectStatus::Completed,
        ProjectStatus::PartiallyActive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Active => "Active",
            ProjectStatus::Implementation => "Implementation",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::PartiallyActive => "Partially Active",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "project status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub category: String,
    pub budget: String,
    pub status: ProjectStatus,
    pub image_url: String,
    pub upvotes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub category: String,
    pub budget: String,
    pub status: ProjectStatus,
    pub image_url: String,
    /// Starting vote count; zero for projects created through the API.
    pub upvotes: i64,
}

/// Home-page poll: one of the most upvoted projects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for Poll {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            title_bn: project.title_bn,
            title_en: project.title_en,
            description_bn: project.description_bn,
            description_en: project.description_en,
            votes: project.upvotes,
            created_at: project.created_at,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub category: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub location: String,
    pub image_url: String,
    pub volunteers: i64,
    pub going: i64,
    pub helpful: i64,
    pub proposer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithProposer {
    #[serde(flatten)]
    pub event: Event,
    pub proposer_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub category: String,
    pub date: String,
    pub location: String,
    pub image_url: String,
    pub volunteers: i64,
    pub going: i64,
    pub helpful: i64,
}

/// An event proposal awaiting governmental approval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEvent {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub description_bn: String,
    pub description_en: String,
    pub category: String,
    pub date: String,
    pub location: String,
    pub image_url: String,
    pub volunteers: i64,
    pub proposer_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Threads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub content_bn: String,
    pub content_en: String,
    pub category: String,
    pub author_id: String,
    pub likes: i64,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewThread {
    pub title_bn: String,
    pub title_en: String,
    pub content_bn: String,
    pub content_en: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: Thread,
    pub comment_count: i64,
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadComment {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: ThreadComment,
    pub author: Option<AuthorSummary>,
}

/// The entity whose counter an action moved, as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionTarget {
    Project(Project),
    Event(Event),
    Thread(Thread),
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Thana,
    Countrywide,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Thana => "thana",
            TargetType::Countrywide => "countrywide",
        }
    }
}

impl FromStr for TargetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thana" => Ok(TargetType::Thana),
            "countrywide" => Ok(TargetType::Countrywide),
            other => Err(UnknownVariant {
                kind: "notification target",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title_bn: String,
    pub title_en: String,
    pub message_bn: String,
    pub message_en: String,
    pub author_id: String,
    pub target_type: TargetType,
    /// Set only for thana-targeted notifications.
    pub target_thana: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether a user living in `thana` should see this notification.
    pub fn is_visible_in(&self, thana: &str) -> bool {
        self.is_active
            && match self.target_type {
                TargetType::Countrywide => true,
                TargetType::Thana => self.target_thana.as_deref() == Some(thana),
            }
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title_bn: String,
    pub title_en: String,
    pub message_bn: String,
    pub message_en: String,
    pub target_type: TargetType,
    pub target_thana: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    #[serde(flatten)]
    pub notification: Notification,
    pub is_read: bool,
}

// =============================================================================
// Participation and certificates
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationType {
    Volunteer,
    Going,
}

impl ParticipationType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationType::Volunteer => "volunteer",
            ParticipationType::Going => "going",
        }
    }
}

impl FromStr for ParticipationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer" => Ok(ParticipationType::Volunteer),
            "going" => Ok(ParticipationType::Going),
            other => Err(UnknownVariant {
                kind: "participation type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub participation_type: ParticipationType,
    pub certificate_generated: bool,
    pub certificate_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedEvent {
    pub event: Event,
    pub participation: Participation,
}

/// Everything needed to authorize and render one certificate.
#[derive(Debug, Clone)]
pub struct ParticipationDetails {
    pub participation: Participation,
    pub event: Event,
    pub user: User,
}

// =============================================================================
// Site content
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutUsContent {
    pub title_en: String,
    pub title_bn: String,
    pub content_en: String,
    pub content_bn: String,
    pub mission_en: String,
    pub mission_bn: String,
    pub vision_en: String,
    pub vision_bn: String,
    pub values_en: String,
    pub values_bn: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutUs {
    #[serde(flatten)]
    pub content: AboutUsContent,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoContent {
    pub title_en: String,
    pub title_bn: String,
    pub address_en: String,
    pub address_bn: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub office_hours_en: String,
    pub office_hours_bn: String,
    pub map_embed: Option<String>,
    /// JSON-encoded social media links, stored verbatim.
    pub social_media: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(flatten)]
    pub content: ContactInfoContent,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// `new`, `read`, `replied` or `closed`.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_round_trips_through_str() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("Paused".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_partially_active_serializes_with_space() {
        let json = serde_json::to_string(&ProjectStatus::PartiallyActive).unwrap();
        assert_eq!(json, "\"Partially Active\"");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(display_name("Rahim", "Uddin", "r@x.bd"), "Rahim Uddin");
        assert_eq!(display_name("Rahim", "", "r@x.bd"), "Rahim");
        assert_eq!(display_name(" ", "", "r@x.bd"), "r@x.bd");
    }

    #[test]
    fn test_notification_visibility() {
        let mut notification = Notification {
            id: "n1".to_string(),
            title_bn: "শিরোনাম".to_string(),
            title_en: "Title".to_string(),
            message_bn: "বার্তা".to_string(),
            message_en: "Message".to_string(),
            author_id: "gov".to_string(),
            target_type: TargetType::Thana,
            target_thana: Some("Dhanmondi".to_string()),
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(notification.is_visible_in("Dhanmondi"));
        assert!(!notification.is_visible_in("Mirpur"));

        notification.target_type = TargetType::Countrywide;
        notification.target_thana = None;
        assert!(notification.is_visible_in("Mirpur"));

        notification.is_active = false;
        assert!(!notification.is_visible_in("Mirpur"));
    }

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = User {
            id: "u1".to_string(),
            profile: AccountProfile {
                username: "citizen@example.bd".to_string(),
                role: Role::Citizen,
                first_name: "Karim".to_string(),
                last_name: "Ahmed".to_string(),
                id_type: "nid".to_string(),
                id_number: "1234567890".to_string(),
                building: "12".to_string(),
                floor: None,
                street: "Road 5".to_string(),
                thana: "Dhanmondi".to_string(),
                city: "Dhaka".to_string(),
                postal_code: "1205".to_string(),
                country: "Bangladesh".to_string(),
                mobile: "01700000000".to_string(),
            },
            password_hash: "salt:key".to_string(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["username"], "citizen@example.bd");
        assert_eq!(value["firstName"], "Karim");
        assert_eq!(value["role"], "citizen");
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password").is_none());
    }
}
