//! Once-per-user actions and the counters they drive.
//!
//! Every togglable interaction (upvoting a project, volunteering for an
//! event, liking a thread, ...) is an [`ActionKind`]. A user either has or
//! has not performed a given action on a given target:
//!
//! ```text
//!            Do                       Undo
//! NotActed --------> Acted    Acted --------> NotActed
//! ```
//!
//! The repository stores one action record per `(kind, target, user)` behind
//! a unique constraint, and moves the target's counter by exactly one in the
//! same transaction as the record insert or delete. A repeated `Do` is a
//! conflict and an `Undo` without a record is a not-found; neither touches
//! the counter.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::{ParticipationType, UnknownVariant};

/// Message returned when volunteering for or attending a past event.
pub const EVENT_ENDED_MESSAGE: &str =
    "This event has ended. Participation is no longer available.";

/// Entity types that carry action counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Project,
    Event,
    Thread,
}

impl TargetKind {
    /// Table holding the target rows.
    pub fn table(self) -> &'static str {
        match self {
            TargetKind::Project => "projects",
            TargetKind::Event => "events",
            TargetKind::Thread => "threads",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            TargetKind::Project => "Project not found",
            TargetKind::Event => "Event not found",
            TargetKind::Thread => "Thread not found",
        }
    }
}

/// A togglable per-user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Project upvote. Poll votes use this kind too.
    ProjectUpvote,
    EventVolunteer,
    EventGoing,
    EventHelpful,
    ThreadLike,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::ProjectUpvote,
        ActionKind::EventVolunteer,
        ActionKind::EventGoing,
        ActionKind::EventHelpful,
        ActionKind::ThreadLike,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::ProjectUpvote => "project_upvote",
            ActionKind::EventVolunteer => "event_volunteer",
            ActionKind::EventGoing => "event_going",
            ActionKind::EventHelpful => "event_helpful",
            ActionKind::ThreadLike => "thread_like",
        }
    }

    pub fn target(self) -> TargetKind {
        match self {
            ActionKind::ProjectUpvote => TargetKind::Project,
            ActionKind::EventVolunteer | ActionKind::EventGoing | ActionKind::EventHelpful => {
                TargetKind::Event
            }
            ActionKind::ThreadLike => TargetKind::Thread,
        }
    }

    /// Counter column on the target table.
    pub fn counter_column(self) -> &'static str {
        match self {
            ActionKind::ProjectUpvote => "upvotes",
            ActionKind::EventVolunteer => "volunteers",
            ActionKind::EventGoing => "going",
            ActionKind::EventHelpful => "helpful",
            ActionKind::ThreadLike => "likes",
        }
    }

    /// Actions that are refused once the event date has passed.
    pub fn requires_open_event(self) -> bool {
        matches!(self, ActionKind::EventVolunteer | ActionKind::EventGoing)
    }

    /// Participation recorded alongside the action, for certificates.
    pub fn participation(self) -> Option<ParticipationType> {
        match self {
            ActionKind::EventVolunteer => Some(ParticipationType::Volunteer),
            ActionKind::EventGoing => Some(ParticipationType::Going),
            _ => None,
        }
    }

    /// Conflict message for a repeated `Do`.
    pub fn already_message(self) -> &'static str {
        match self {
            ActionKind::ProjectUpvote => "Already voted",
            ActionKind::EventVolunteer => "Already volunteered",
            ActionKind::EventGoing => "Already marked going",
            ActionKind::EventHelpful => "Already marked helpful",
            ActionKind::ThreadLike => "Already liked",
        }
    }

    /// Not-found message for an `Undo` without a matching record.
    pub fn missing_message(self) -> &'static str {
        match self {
            ActionKind::ProjectUpvote => "Vote not found",
            ActionKind::EventVolunteer => "Not volunteered",
            ActionKind::EventGoing => "Not marked going",
            ActionKind::EventHelpful => "Not marked helpful",
            ActionKind::ThreadLike => "Not liked",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "action kind",
                value: s.to_string(),
            })
    }
}

/// Whether an event dated `date` is over as of `today`.
///
/// Both values are `YYYY-MM-DD`, so lexicographic order is date order.
pub fn is_event_finished(date: &str, today: &str) -> bool {
    date < today
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Accepts exactly `YYYY-MM-DD` with a real calendar date.
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_finished_is_strictly_before_today() {
        assert!(is_event_finished("2024-01-31", "2024-02-01"));
        assert!(!is_event_finished("2024-02-01", "2024-02-01"));
        assert!(!is_event_finished("2024-02-02", "2024-02-01"));
    }

    #[test]
    fn test_event_finished_compares_across_years() {
        assert!(is_event_finished("2023-12-31", "2024-01-01"));
        assert!(!is_event_finished("2025-01-01", "2024-12-31"));
    }

    #[test]
    fn test_iso_date_validation() {
        assert!(is_iso_date("2025-12-16"));
        assert!(!is_iso_date("2025-2-1"));
        assert!(!is_iso_date("2025-02-30"));
        assert!(!is_iso_date("December 16, 2025"));
        assert!(!is_iso_date(""));
    }

    #[test]
    fn test_today_iso_is_iso() {
        assert!(is_iso_date(&today_iso()));
    }

    #[test]
    fn test_action_kind_round_trips() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("thread_dislike".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_only_volunteer_and_going_are_date_gated() {
        let gated: Vec<_> = ActionKind::ALL
            .into_iter()
            .filter(|k| k.requires_open_event())
            .collect();
        assert_eq!(
            gated,
            vec![ActionKind::EventVolunteer, ActionKind::EventGoing]
        );
        for kind in gated {
            assert_eq!(kind.target(), TargetKind::Event);
            assert!(kind.participation().is_some());
        }
        assert!(ActionKind::EventHelpful.participation().is_none());
    }

    #[test]
    fn test_counter_columns_are_distinct_per_target() {
        use std::collections::HashSet;
        let pairs: HashSet<_> = ActionKind::ALL
            .into_iter()
            .map(|k| (k.target().table(), k.counter_column()))
            .collect();
        assert_eq!(pairs.len(), ActionKind::ALL.len());
    }
}
