//! Action records and the counters they drive.
//!
//! Each `Do` inserts into `action_records` (unique on kind, target and user)
//! and bumps the target's counter column inside one `IMMEDIATE`
//! transaction; each `Undo` deletes the record and decrements. A failed
//! insert or an empty delete leaves the counter untouched.

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::debug;

use super::super::RepositoryError;
use super::events::load_event;
use super::projects::load_project;
use super::threads::load_thread;
use super::{is_unique_violation, new_id, now_millis, sql_err, SqliteRepository};
use crate::action::{is_event_finished, ActionKind, TargetKind, EVENT_ENDED_MESSAGE};
use crate::model::ActionTarget;

fn load_target(
    conn: &Connection,
    target: TargetKind,
    id: &str,
) -> Result<Option<ActionTarget>, RepositoryError> {
    Ok(match target {
        TargetKind::Project => load_project(conn, id)?.map(ActionTarget::Project),
        TargetKind::Event => load_event(conn, id)?.map(ActionTarget::Event),
        TargetKind::Thread => load_thread(conn, id)?.map(ActionTarget::Thread),
    })
}

/// Move the counter for `kind` on `target_id` by `delta`.
fn adjust_counter(
    conn: &Connection,
    kind: ActionKind,
    target_id: &str,
    delta: i64,
    operation: &'static str,
) -> Result<(), RepositoryError> {
    let column = kind.counter_column();
    // Table and column names come from the closed ActionKind mapping.
    conn.execute(
        &format!(
            "UPDATE {table} SET {column} = {column} + ?2 WHERE id = ?1",
            table = kind.target().table(),
            column = column
        ),
        params![target_id, delta],
    )
    .map_err(sql_err(operation))?;
    Ok(())
}

impl SqliteRepository {
    pub(super) async fn apply_action_impl(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
        today: &str,
    ) -> Result<ActionTarget, RepositoryError> {
        let target_id = target_id.to_string();
        let user_id = user_id.to_string();
        let today = today.to_string();
        self.run("apply_action", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("apply_action"))?;

            let target = load_target(&tx, kind.target(), &target_id)?
                .ok_or_else(|| RepositoryError::not_found(kind.target().not_found_message()))?;

            if kind.requires_open_event() {
                if let ActionTarget::Event(event) = &target {
                    if is_event_finished(&event.date, &today) {
                        return Err(RepositoryError::rejected(EVENT_ENDED_MESSAGE));
                    }
                }
            }

            tx.execute(
                "INSERT INTO action_records (id, action_kind, target_id, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![new_id(), kind.as_str(), target_id, user_id, now_millis()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepositoryError::conflict(kind.already_message())
                } else {
                    RepositoryError::storage("apply_action", e.to_string())
                }
            })?;

            adjust_counter(&tx, kind, &target_id, 1, "apply_action")?;

            if let Some(participation_type) = kind.participation() {
                tx.execute(
                    "INSERT OR IGNORE INTO event_participation
                         (id, event_id, user_id, participation_type, certificate_generated,
                          certificate_url, created_at)
                     VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5)",
                    params![
                        new_id(),
                        target_id,
                        user_id,
                        participation_type.as_str(),
                        now_millis()
                    ],
                )
                .map_err(sql_err("apply_action"))?;
            }

            let updated = load_target(&tx, kind.target(), &target_id)?.ok_or_else(|| {
                RepositoryError::storage("apply_action", "target vanished inside transaction")
            })?;
            tx.commit().map_err(sql_err("apply_action"))?;
            debug!(%kind, %target_id, %user_id, "Recorded action");
            Ok(updated)
        })
        .await
    }

    pub(super) async fn revoke_action_impl(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<ActionTarget, RepositoryError> {
        let target_id = target_id.to_string();
        let user_id = user_id.to_string();
        self.run("revoke_action", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("revoke_action"))?;

            let deleted = tx
                .execute(
                    "DELETE FROM action_records
                     WHERE action_kind = ?1 AND target_id = ?2 AND user_id = ?3",
                    params![kind.as_str(), target_id, user_id],
                )
                .map_err(sql_err("revoke_action"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found(kind.missing_message()));
            }

            adjust_counter(&tx, kind, &target_id, -1, "revoke_action")?;

            // A participation with an issued certificate outlives the action.
            if let Some(participation_type) = kind.participation() {
                tx.execute(
                    "DELETE FROM event_participation
                     WHERE event_id = ?1 AND user_id = ?2 AND participation_type = ?3
                       AND certificate_generated = 0",
                    params![target_id, user_id, participation_type.as_str()],
                )
                .map_err(sql_err("revoke_action"))?;
            }

            let updated = load_target(&tx, kind.target(), &target_id)?
                .ok_or_else(|| RepositoryError::not_found(kind.target().not_found_message()))?;
            tx.commit().map_err(sql_err("revoke_action"))?;
            debug!(%kind, %target_id, %user_id, "Revoked action");
            Ok(updated)
        })
        .await
    }

    pub(super) async fn has_acted_impl(
        &self,
        kind: ActionKind,
        target_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        let target_id = target_id.to_string();
        let user_id = user_id.to_string();
        self.run("has_acted", move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM action_records
                 WHERE action_kind = ?1 AND target_id = ?2 AND user_id = ?3)",
                params![kind.as_str(), target_id, user_id],
                |row| row.get(0),
            )
            .map_err(sql_err("has_acted"))
        })
        .await
    }

    pub(super) async fn count_actions_impl(
        &self,
        kind: ActionKind,
        target_id: &str,
    ) -> Result<i64, RepositoryError> {
        let target_id = target_id.to_string();
        self.run("count_actions", move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM action_records WHERE action_kind = ?1 AND target_id = ?2",
                params![kind.as_str(), target_id],
                |row| row.get(0),
            )
            .map_err(sql_err("count_actions"))
        })
        .await
    }
}
