//! Tests for SQLite repository implementation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rusqlite::params;
use tokio::task::JoinSet;

use super::super::{CivicRepository, RepositoryError};
use super::{SqliteRepository, CURRENT_SCHEMA_VERSION};
use crate::action::{ActionKind, EVENT_ENDED_MESSAGE};
use crate::model::{
    AboutUsContent, AccountProfile, ActionTarget, NewAccount, NewContactSubmission, NewEvent,
    NewNotification, NewProject, NewThread, ParticipationType, ProjectStatus, Role, TargetType,
};

use proptest::prelude::*;

const TODAY: &str = "2025-06-15";

fn profile(n: u32, role: Role) -> AccountProfile {
    AccountProfile {
        username: format!("user{}@example.bd", n),
        role,
        first_name: format!("First{}", n),
        last_name: format!("Last{}", n),
        id_type: "nid".to_string(),
        id_number: format!("ID-{}", n),
        building: "12".to_string(),
        floor: None,
        street: "Road 5".to_string(),
        thana: "Dhanmondi".to_string(),
        city: "Dhaka".to_string(),
        postal_code: "1205".to_string(),
        country: "Bangladesh".to_string(),
        mobile: format!("0170000{:04}", n),
    }
}

fn account(n: u32) -> NewAccount {
    NewAccount {
        profile: profile(n, Role::Citizen),
        password_hash: "salt:key".to_string(),
    }
}

fn new_project(upvotes: i64) -> NewProject {
    NewProject {
        title_bn: "সেতু".to_string(),
        title_en: "Bridge".to_string(),
        description_bn: "নতুন সেতু".to_string(),
        description_en: "A new bridge".to_string(),
        category: "Infrastructure".to_string(),
        budget: "৳ 10 Crore".to_string(),
        status: ProjectStatus::Planning,
        image_url: "/img/bridge.jpg".to_string(),
        upvotes,
    }
}

fn new_event(date: &str) -> NewEvent {
    NewEvent {
        title_bn: "পরিচ্ছন্নতা".to_string(),
        title_en: "Clean-up Drive".to_string(),
        description_bn: "পার্ক পরিষ্কার".to_string(),
        description_en: "Park clean-up".to_string(),
        category: "Environment".to_string(),
        date: date.to_string(),
        location: "Ramna Park".to_string(),
        image_url: "/img/cleanup.jpg".to_string(),
        volunteers: 0,
        going: 0,
        helpful: 0,
    }
}

fn new_thread(title: &str) -> NewThread {
    NewThread {
        title_bn: title.to_string(),
        title_en: title.to_string(),
        content_bn: "বিষয়বস্তু".to_string(),
        content_en: "Content".to_string(),
        category: "General".to_string(),
    }
}

fn new_notification(target_type: TargetType, thana: Option<&str>) -> NewNotification {
    NewNotification {
        title_bn: "নোটিশ".to_string(),
        title_en: "Notice".to_string(),
        message_bn: "বার্তা".to_string(),
        message_en: "Message".to_string(),
        target_type,
        target_thana: thana.map(str::to_string),
    }
}

fn project_of(target: ActionTarget) -> crate::model::Project {
    match target {
        ActionTarget::Project(project) => project,
        other => panic!("expected project, got {:?}", other),
    }
}

fn event_of(target: ActionTarget) -> crate::model::Event {
    match target {
        ActionTarget::Event(event) => event,
        other => panic!("expected event, got {:?}", other),
    }
}

fn thread_of(target: ActionTarget) -> crate::model::Thread {
    match target {
        ActionTarget::Thread(thread) => thread,
        other => panic!("expected thread, got {:?}", other),
    }
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
async fn test_fresh_database_records_schema_version() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let conn = repo.conn.lock().unwrap();
    let version: i64 = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_newer_schema_version_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("test.db");
    {
        let repo = SqliteRepository::new(&db_path).unwrap();
        let conn = repo.conn.lock().unwrap();
        conn.execute(
            "UPDATE schema_version SET version = ?1 WHERE id = 1",
            params![CURRENT_SCHEMA_VERSION + 1],
        )
        .unwrap();
    }
    let result = SqliteRepository::new(&db_path);
    assert!(matches!(result, Err(RepositoryError::Storage { .. })));
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("civic.db");
    let user = account(1);

    let project_id = {
        let repo = SqliteRepository::new(&db_path).unwrap();
        let user = repo.create_user(user).await.unwrap();
        let project = repo.create_project(new_project(5)).await.unwrap();
        repo.apply_action(ActionKind::ProjectUpvote, &project.id, &user.id, TODAY)
            .await
            .unwrap();
        project.id
    };

    let repo = SqliteRepository::new(&db_path).unwrap();
    let project = repo.get_project(&project_id).await.unwrap().unwrap();
    assert_eq!(project.upvotes, 6);
    assert_eq!(
        repo.count_actions(ActionKind::ProjectUpvote, &project_id)
            .await
            .unwrap(),
        1
    );
}

// =============================================================================
// Action counters
// =============================================================================

#[tokio::test]
async fn test_upvote_scenario() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let project = repo.create_project(new_project(5)).await.unwrap();

    let voted = project_of(
        repo.apply_action(ActionKind::ProjectUpvote, &project.id, "user-a", TODAY)
            .await
            .unwrap(),
    );
    assert_eq!(voted.upvotes, 6);

    let again = repo
        .apply_action(ActionKind::ProjectUpvote, &project.id, "user-a", TODAY)
        .await;
    match again {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "Already voted"),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(repo.get_project(&project.id).await.unwrap().unwrap().upvotes, 6);

    let unvoted = project_of(
        repo.revoke_action(ActionKind::ProjectUpvote, &project.id, "user-a")
            .await
            .unwrap(),
    );
    assert_eq!(unvoted.upvotes, 5);

    let second_undo = repo
        .revoke_action(ActionKind::ProjectUpvote, &project.id, "user-a")
        .await;
    match second_undo {
        Err(RepositoryError::NotFound(message)) => assert_eq!(message, "Vote not found"),
        other => panic!("expected not found, got {:?}", other),
    }
    assert_eq!(repo.get_project(&project.id).await.unwrap().unwrap().upvotes, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upvotes_by_one_user_record_once() {
    let repo = Arc::new(SqliteRepository::new_in_memory().unwrap());
    let project = repo.create_project(new_project(5)).await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let repo = repo.clone();
        let id = project.id.clone();
        tasks.spawn(async move {
            repo.apply_action(ActionKind::ProjectUpvote, &id, "user-a", TODAY)
                .await
        });
    }

    let mut recorded = 0;
    let mut conflicts = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => recorded += 1,
            Err(RepositoryError::Conflict(message)) => {
                assert_eq!(message, "Already voted");
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!((recorded, conflicts), (1, 15));
    assert_eq!(repo.get_project(&project.id).await.unwrap().unwrap().upvotes, 6);
    assert_eq!(
        repo.count_actions(ActionKind::ProjectUpvote, &project.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upvotes_by_distinct_users_all_count() {
    const USERS: i64 = 16;
    let repo = Arc::new(SqliteRepository::new_in_memory().unwrap());
    let project = repo.create_project(new_project(5)).await.unwrap();

    let mut tasks = JoinSet::new();
    for n in 0..USERS {
        let repo = repo.clone();
        let id = project.id.clone();
        tasks.spawn(async move {
            repo.apply_action(ActionKind::ProjectUpvote, &id, &format!("user-{}", n), TODAY)
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    assert_eq!(
        repo.get_project(&project.id).await.unwrap().unwrap().upvotes,
        5 + USERS
    );
    assert_eq!(
        repo.count_actions(ActionKind::ProjectUpvote, &project.id)
            .await
            .unwrap(),
        USERS
    );
}

#[tokio::test]
async fn test_action_on_missing_target_is_not_found() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let result = repo
        .apply_action(ActionKind::EventHelpful, "missing", "user-a", TODAY)
        .await;
    match result {
        Err(RepositoryError::NotFound(message)) => assert_eq!(message, "Event not found"),
        other => panic!("expected not found, got {:?}", other),
    }
    assert_eq!(
        repo.count_actions(ActionKind::EventHelpful, "missing")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_has_acted_tracks_each_kind_separately() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let event = repo.create_event(new_event("2025-07-01"), None).await.unwrap();

    repo.apply_action(ActionKind::EventGoing, &event.id, "user-a", TODAY)
        .await
        .unwrap();

    assert!(repo
        .has_acted(ActionKind::EventGoing, &event.id, "user-a")
        .await
        .unwrap());
    assert!(!repo
        .has_acted(ActionKind::EventVolunteer, &event.id, "user-a")
        .await
        .unwrap());
    assert!(!repo
        .has_acted(ActionKind::EventGoing, &event.id, "user-b")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_past_event_rejects_volunteer_and_going_but_not_helpful() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let event = repo.create_event(new_event("2025-06-14"), None).await.unwrap();

    for kind in [ActionKind::EventVolunteer, ActionKind::EventGoing] {
        match repo.apply_action(kind, &event.id, "user-a", TODAY).await {
            Err(RepositoryError::Rejected(message)) => assert_eq!(message, EVENT_ENDED_MESSAGE),
            other => panic!("expected rejection for {}, got {:?}", kind, other),
        }
    }

    let helpful = event_of(
        repo.apply_action(ActionKind::EventHelpful, &event.id, "user-a", TODAY)
            .await
            .unwrap(),
    );
    assert_eq!(helpful.helpful, 1);
    assert_eq!(helpful.volunteers, 0);
    assert_eq!(helpful.going, 0);
}

#[tokio::test]
async fn test_event_today_is_still_open() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let event = repo.create_event(new_event(TODAY), None).await.unwrap();
    let updated = event_of(
        repo.apply_action(ActionKind::EventVolunteer, &event.id, "user-a", TODAY)
            .await
            .unwrap(),
    );
    assert_eq!(updated.volunteers, 1);
}

#[tokio::test]
async fn test_volunteering_records_participation_and_undo_removes_it() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let user = repo.create_user(account(1)).await.unwrap();
    let event = repo.create_event(new_event("2025-06-20"), None).await.unwrap();

    repo.apply_action(ActionKind::EventVolunteer, &event.id, &user.id, TODAY)
        .await
        .unwrap();

    // Once the date passes the participation is listed as finished.
    let finished = repo
        .finished_participations(&user.id, "2025-06-21")
        .await
        .unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(
        finished[0].participation.participation_type,
        ParticipationType::Volunteer
    );
    assert!(!finished[0].participation.certificate_generated);

    repo.revoke_action(ActionKind::EventVolunteer, &event.id, &user.id)
        .await
        .unwrap();
    let finished = repo
        .finished_participations(&user.id, "2025-06-21")
        .await
        .unwrap();
    assert!(finished.is_empty());
}

#[tokio::test]
async fn test_generated_certificate_survives_undo() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let user = repo.create_user(account(1)).await.unwrap();
    let event = repo.create_event(new_event("2025-06-20"), None).await.unwrap();

    repo.apply_action(ActionKind::EventGoing, &event.id, &user.id, TODAY)
        .await
        .unwrap();
    let finished = repo
        .finished_participations(&user.id, "2025-06-21")
        .await
        .unwrap();
    let participation_id = finished[0].participation.id.clone();

    let participation = repo
        .mark_certificate_generated(&participation_id, "/api/certificates/x.svg")
        .await
        .unwrap();
    assert!(participation.certificate_generated);

    let updated = event_of(
        repo.revoke_action(ActionKind::EventGoing, &event.id, &user.id)
            .await
            .unwrap(),
    );
    assert_eq!(updated.going, 0);

    let details = repo
        .get_participation_details(&participation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(details.participation.certificate_generated);
    assert_eq!(details.user.id, user.id);
    assert_eq!(details.event.id, event.id);
}

#[tokio::test]
async fn test_thread_like_is_a_toggle() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let thread = repo.create_thread(new_thread("Roads"), "author").await.unwrap();

    let liked = thread_of(
        repo.apply_action(ActionKind::ThreadLike, &thread.id, "user-a", TODAY)
            .await
            .unwrap(),
    );
    assert_eq!(liked.likes, 1);

    assert!(matches!(
        repo.apply_action(ActionKind::ThreadLike, &thread.id, "user-a", TODAY)
            .await,
        Err(RepositoryError::Conflict(_))
    ));

    let unliked = thread_of(
        repo.revoke_action(ActionKind::ThreadLike, &thread.id, "user-a")
            .await
            .unwrap(),
    );
    assert_eq!(unliked.likes, 0);
}

#[tokio::test]
async fn test_delete_project_removes_action_records() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let project = repo.create_project(new_project(0)).await.unwrap();
    repo.apply_action(ActionKind::ProjectUpvote, &project.id, "user-a", TODAY)
        .await
        .unwrap();

    assert!(repo.delete_project(&project.id).await.unwrap());
    assert!(!repo.delete_project(&project.id).await.unwrap());
    assert_eq!(
        repo.count_actions(ActionKind::ProjectUpvote, &project.id)
            .await
            .unwrap(),
        0
    );
}

#[derive(Debug, Clone)]
enum Op {
    Do(u8),
    Undo(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..4).prop_map(Op::Do), (0u8..4).prop_map(Op::Undo)]
}

proptest! {
    /// Property: for any interleaving of Do/Undo by several users, the counter
    /// equals its initial value plus the number of live action records.
    #[test]
    fn counter_matches_live_records(initial in 0i64..100, ops in proptest::collection::vec(arb_op(), 0..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let repo = SqliteRepository::new_in_memory().unwrap();
            let project = repo.create_project(new_project(initial)).await.unwrap();
            let mut voted = std::collections::HashSet::new();

            for op in &ops {
                match op {
                    Op::Do(user) => {
                        let user_id = format!("user-{}", user);
                        let result = repo
                            .apply_action(ActionKind::ProjectUpvote, &project.id, &user_id, TODAY)
                            .await;
                        if voted.insert(*user) {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert!(matches!(result, Err(RepositoryError::Conflict(_))));
                        }
                    }
                    Op::Undo(user) => {
                        let user_id = format!("user-{}", user);
                        let result = repo
                            .revoke_action(ActionKind::ProjectUpvote, &project.id, &user_id)
                            .await;
                        if voted.remove(user) {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert!(matches!(result, Err(RepositoryError::NotFound(_))));
                        }
                    }
                }

                let current = repo.get_project(&project.id).await.unwrap().unwrap();
                let live = repo
                    .count_actions(ActionKind::ProjectUpvote, &project.id)
                    .await
                    .unwrap();
                prop_assert_eq!(current.upvotes - initial, live);
                prop_assert_eq!(live, voted.len() as i64);
            }
            Ok(())
        })?;
    }
}

// =============================================================================
// Accounts and sessions
// =============================================================================

#[tokio::test]
async fn test_registration_uniqueness_across_users_and_pending() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    repo.create_user(account(1)).await.unwrap();
    repo.submit_registration(account(2)).await.unwrap();

    // Same email as an existing user.
    let mut dup_email = account(3);
    dup_email.profile.username = "user1@example.bd".to_string();
    match repo.submit_registration(dup_email).await {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "Email already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }

    // Same mobile as a pending registration.
    let mut dup_mobile = account(4);
    dup_mobile.profile.mobile = account(2).profile.mobile;
    match repo.submit_registration(dup_mobile).await {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "Mobile already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let mut dup_id = account(5);
    dup_id.profile.id_number = "ID-1".to_string();
    match repo.submit_registration(dup_id).await {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "ID number already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }

    assert_eq!(repo.list_pending_approvals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_approve_moves_registration_into_users() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let first = repo.submit_registration(account(1)).await.unwrap();
    let second = repo.submit_registration(account(2)).await.unwrap();

    let pending = repo.list_pending_approvals().await.unwrap();
    assert_eq!(
        pending.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec![first.id.as_str(), second.id.as_str()]
    );

    let user = repo.approve_registration(&first.id).await.unwrap();
    assert_eq!(user.id, first.id);
    assert_eq!(user.profile, account(1).profile);
    assert_eq!(user.password_hash, "salt:key");

    let by_name = repo
        .get_user_by_username("user1@example.bd")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(repo.list_pending_approvals().await.unwrap().len(), 1);

    assert!(matches!(
        repo.approve_registration(&first.id).await,
        Err(RepositoryError::NotFound(_))
    ));
    assert!(repo.reject_registration(&second.id).await.unwrap());
    assert!(!repo.reject_registration(&second.id).await.unwrap());
}

#[tokio::test]
async fn test_approval_keeps_registration_time() {
    const SUBMITTED_AT: i64 = 1_700_000_000_000;
    let repo = SqliteRepository::new_in_memory().unwrap();
    let pending = repo.submit_registration(account(1)).await.unwrap();
    {
        let conn = repo.conn.lock().unwrap();
        conn.execute(
            "UPDATE pending_approvals SET created_at = ?1 WHERE id = ?2",
            params![SUBMITTED_AT, pending.id],
        )
        .unwrap();
    }

    repo.approve_registration(&pending.id).await.unwrap();

    let conn = repo.conn.lock().unwrap();
    let created_at: i64 = conn
        .query_row(
            "SELECT created_at FROM users WHERE id = ?1",
            params![pending.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(created_at, SUBMITTED_AT);
}

#[tokio::test]
async fn test_approve_rechecks_against_users() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let pending = repo.submit_registration(account(1)).await.unwrap();

    // An account created out of band takes the same mobile number.
    let mut direct = account(2);
    direct.profile.mobile = account(1).profile.mobile;
    repo.create_user(direct).await.unwrap();

    match repo.approve_registration(&pending.id).await {
        Err(RepositoryError::Conflict(message)) => assert_eq!(message, "Mobile already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(repo.list_pending_approvals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let user = repo.create_user(account(1)).await.unwrap();
    let now = Utc::now();

    repo.create_session("live", &user.id, now + Duration::hours(1))
        .await
        .unwrap();
    repo.create_session("stale", &user.id, now - Duration::seconds(1))
        .await
        .unwrap();

    let resolved = repo.session_user("live", now).await.unwrap().unwrap();
    assert_eq!(resolved.id, user.id);

    assert!(repo.session_user("stale", now).await.unwrap().is_none());
    // The expired row was deleted on lookup.
    assert_eq!(repo.purge_expired_sessions(now).await.unwrap(), 0);

    repo.delete_session("live").await.unwrap();
    assert!(repo.session_user("live", now).await.unwrap().is_none());
    assert!(repo.session_user("unknown", now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_purge_expired_sessions() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let now = Utc::now();
    repo.create_session("a", "u", now - Duration::hours(2))
        .await
        .unwrap();
    repo.create_session("b", "u", now - Duration::hours(1))
        .await
        .unwrap();
    repo.create_session("c", "u", now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(repo.purge_expired_sessions(now).await.unwrap(), 2);
}

// =============================================================================
// Projects, events, threads
// =============================================================================

#[tokio::test]
async fn test_top_projects_orders_by_upvotes() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    for upvotes in [3, 10, 1, 7, 5] {
        repo.create_project(new_project(upvotes)).await.unwrap();
    }
    let top: Vec<i64> = repo
        .top_projects(4)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.upvotes)
        .collect();
    assert_eq!(top, vec![10, 7, 5, 3]);
    assert_eq!(repo.list_projects().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_update_project_status() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let project = repo.create_project(new_project(0)).await.unwrap();
    let updated = repo
        .update_project_status(&project.id, ProjectStatus::PartiallyActive)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::PartiallyActive);
    assert!(repo
        .update_project_status("missing", ProjectStatus::Active)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_event_proposal_approval() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let proposer = repo.create_user(account(1)).await.unwrap();

    let mut proposal = new_event("2025-08-01");
    proposal.volunteers = 12;
    let pending = repo.propose_event(proposal, &proposer.id).await.unwrap();
    assert_eq!(repo.list_pending_events().await.unwrap().len(), 1);
    assert!(repo.list_events().await.unwrap().is_empty());

    let event = repo.approve_pending_event(&pending.id).await.unwrap();
    assert_eq!(event.volunteers, 12);
    assert_eq!(event.going, 0);
    assert_eq!(event.proposer_id.as_deref(), Some(proposer.id.as_str()));
    assert!(repo.list_pending_events().await.unwrap().is_empty());

    let listed = repo.list_events().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].proposer_name.as_deref(), Some("First1 Last1"));

    assert!(matches!(
        repo.approve_pending_event(&pending.id).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_event_cascades() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let user = repo.create_user(account(1)).await.unwrap();
    let event = repo.create_event(new_event("2025-06-20"), None).await.unwrap();
    repo.apply_action(ActionKind::EventVolunteer, &event.id, &user.id, TODAY)
        .await
        .unwrap();
    repo.apply_action(ActionKind::EventHelpful, &event.id, &user.id, TODAY)
        .await
        .unwrap();

    assert!(repo.delete_event(&event.id).await.unwrap());
    for kind in [ActionKind::EventVolunteer, ActionKind::EventHelpful] {
        assert_eq!(repo.count_actions(kind, &event.id).await.unwrap(), 0);
    }
    assert!(repo
        .finished_participations(&user.id, "2099-01-01")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_pinned_threads_list_first() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let author = repo.create_user(account(1)).await.unwrap();
    let older = repo.create_thread(new_thread("older"), &author.id).await.unwrap();
    let newer = repo.create_thread(new_thread("newer"), &author.id).await.unwrap();

    let order: Vec<String> = repo
        .list_threads()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.thread.id)
        .collect();
    assert_eq!(order, vec![newer.id.clone(), older.id.clone()]);

    let pinned = repo.set_thread_pinned(&older.id, true).await.unwrap().unwrap();
    assert!(pinned.pinned);

    let listed = repo.list_threads().await.unwrap();
    assert_eq!(listed[0].thread.id, older.id);
    assert_eq!(
        listed[0].author.as_ref().map(|a| a.username.as_str()),
        Some("user1@example.bd")
    );
    assert!(repo.set_thread_pinned("missing", true).await.unwrap().is_none());
}

#[tokio::test]
async fn test_comments() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let thread = repo.create_thread(new_thread("t"), "ghost").await.unwrap();

    repo.add_comment(&thread.id, "ghost", "first").await.unwrap();
    repo.add_comment(&thread.id, "ghost", "second").await.unwrap();

    let comments = repo.list_comments(&thread.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].comment.text, "second");
    assert!(comments[0].author.is_none());

    let summary = &repo.list_threads().await.unwrap()[0];
    assert_eq!(summary.comment_count, 2);
    assert!(summary.author.is_none());

    assert!(matches!(
        repo.add_comment("missing", "ghost", "text").await,
        Err(RepositoryError::NotFound(_))
    ));

    assert!(repo.delete_thread(&thread.id).await.unwrap());
    assert!(repo.list_comments(&thread.id).await.unwrap().is_empty());
}

// =============================================================================
// Notifications, site content
// =============================================================================

#[tokio::test]
async fn test_notification_visibility_and_reads() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let everywhere = repo
        .create_notification(new_notification(TargetType::Countrywide, Some("ignored")), "gov")
        .await
        .unwrap();
    assert!(everywhere.target_thana.is_none());
    let local = repo
        .create_notification(new_notification(TargetType::Thana, Some("Dhanmondi")), "gov")
        .await
        .unwrap();
    repo.create_notification(new_notification(TargetType::Thana, Some("Mirpur")), "gov")
        .await
        .unwrap();

    let visible = repo.notifications_for_user("u1", "Dhanmondi").await.unwrap();
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|n| !n.is_read));

    assert!(repo.mark_notification_read(&local.id, "u1").await.unwrap());
    assert!(!repo.mark_notification_read(&local.id, "u1").await.unwrap());
    assert!(matches!(
        repo.mark_notification_read("missing", "u1").await,
        Err(RepositoryError::NotFound(_))
    ));

    assert_eq!(
        repo.mark_all_notifications_read("u1", "Dhanmondi")
            .await
            .unwrap(),
        1
    );
    let visible = repo.notifications_for_user("u1", "Dhanmondi").await.unwrap();
    assert!(visible.iter().all(|n| n.is_read));

    assert!(repo.deactivate_notification(&everywhere.id).await.unwrap());
    let visible = repo.notifications_for_user("u1", "Dhanmondi").await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(repo.list_notifications().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_about_upsert_replaces_single_row() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    assert!(repo.get_about().await.unwrap().is_none());

    let mut content = AboutUsContent {
        title_en: "About".to_string(),
        title_bn: "আমাদের সম্পর্কে".to_string(),
        content_en: "c".to_string(),
        content_bn: "c".to_string(),
        mission_en: "m".to_string(),
        mission_bn: "m".to_string(),
        vision_en: "v".to_string(),
        vision_bn: "v".to_string(),
        values_en: "x".to_string(),
        values_bn: "x".to_string(),
        image_url: "/img/about.jpg".to_string(),
    };
    repo.upsert_about(content.clone()).await.unwrap();
    content.title_en = "About us".to_string();
    let saved = repo.upsert_about(content.clone()).await.unwrap();
    assert_eq!(saved.content, content);

    let conn = repo.conn.lock().unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM about_us", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_contact_submission_defaults_to_new() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let submission = repo
        .submit_contact(NewContactSubmission {
            name: "Rahim".to_string(),
            email: "rahim@example.bd".to_string(),
            subject: "Streetlight".to_string(),
            message: "Broken on Road 5".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(submission.status, "new");
}

#[tokio::test]
async fn test_corrupt_enum_value_is_reported_as_corruption() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let project = repo.create_project(new_project(0)).await.unwrap();
    {
        let conn = repo.conn.lock().unwrap();
        conn.execute(
            "UPDATE projects SET status = 'Paused' WHERE id = ?1",
            params![project.id],
        )
        .unwrap();
    }
    assert!(matches!(
        repo.get_project(&project.id).await,
        Err(RepositoryError::Corruption { .. })
    ));
}
