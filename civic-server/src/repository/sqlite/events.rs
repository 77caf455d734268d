//! Published events and event proposals.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::super::RepositoryError;
use super::{
    new_id, now_millis, qualify, sql_err, timestamp, usize_to_i64_limit, SqliteRepository,
};
use crate::action::{ActionKind, TargetKind};
use crate::model::{display_name, Event, EventWithProposer, NewEvent, PendingEvent};

pub(super) const EVENT_COLUMNS: &str = "id, title_bn, title_en, description_bn, description_en, \
     category, date, location, image_url, volunteers, going, helpful, proposer_id, created_at";

pub(super) const EVENT_COLUMN_COUNT: usize = 14;

const PENDING_EVENT_COLUMNS: &str = "id, title_bn, title_en, description_bn, description_en, \
     category, date, location, image_url, volunteers, proposer_id, created_at";

/// Read an event starting at column `offset`.
pub(super) fn event_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(offset)?,
        title_bn: row.get(offset + 1)?,
        title_en: row.get(offset + 2)?,
        description_bn: row.get(offset + 3)?,
        description_en: row.get(offset + 4)?,
        category: row.get(offset + 5)?,
        date: row.get(offset + 6)?,
        location: row.get(offset + 7)?,
        image_url: row.get(offset + 8)?,
        volunteers: row.get(offset + 9)?,
        going: row.get(offset + 10)?,
        helpful: row.get(offset + 11)?,
        proposer_id: row.get(offset + 12)?,
        created_at: timestamp(row, offset + 13)?,
    })
}

fn pending_event_from_row(row: &Row<'_>) -> rusqlite::Result<PendingEvent> {
    Ok(PendingEvent {
        id: row.get(0)?,
        title_bn: row.get(1)?,
        title_en: row.get(2)?,
        description_bn: row.get(3)?,
        description_en: row.get(4)?,
        category: row.get(5)?,
        date: row.get(6)?,
        location: row.get(7)?,
        image_url: row.get(8)?,
        volunteers: row.get(9)?,
        proposer_id: row.get(10)?,
        created_at: timestamp(row, 11)?,
    })
}

pub(super) fn load_event(conn: &Connection, id: &str) -> Result<Option<Event>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
        params![id],
        |row| event_from_row(row, 0),
    )
    .optional()
    .map_err(sql_err("get_event"))
}

fn insert_event(
    conn: &Connection,
    id: &str,
    event: &NewEvent,
    proposer_id: Option<&str>,
) -> Result<(), RepositoryError> {
    conn.execute(
        &format!(
            "INSERT INTO events ({})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            EVENT_COLUMNS
        ),
        params![
            id,
            event.title_bn,
            event.title_en,
            event.description_bn,
            event.description_en,
            event.category,
            event.date,
            event.location,
            event.image_url,
            event.volunteers,
            event.going,
            event.helpful,
            proposer_id,
            now_millis()
        ],
    )
    .map_err(sql_err("insert event"))?;
    Ok(())
}

impl SqliteRepository {
    pub(super) async fn list_events_impl(&self) -> Result<Vec<EventWithProposer>, RepositoryError> {
        self.run("list_events", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {}, u.first_name, u.last_name, u.username
                     FROM events e
                     LEFT JOIN users u ON u.id = e.proposer_id
                     ORDER BY e.created_at DESC, e.rowid DESC",
                    qualify(EVENT_COLUMNS, "e")
                ))
                .map_err(sql_err("list_events"))?;
            let rows = stmt
                .query_map([], |row| {
                    let event = event_from_row(row, 0)?;
                    let first: Option<String> = row.get(EVENT_COLUMN_COUNT)?;
                    let last: Option<String> = row.get(EVENT_COLUMN_COUNT + 1)?;
                    let username: Option<String> = row.get(EVENT_COLUMN_COUNT + 2)?;
                    let proposer_name = username.map(|username| {
                        display_name(
                            first.as_deref().unwrap_or_default(),
                            last.as_deref().unwrap_or_default(),
                            &username,
                        )
                    });
                    Ok(EventWithProposer {
                        event,
                        proposer_name,
                    })
                })
                .map_err(sql_err("list_events"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_events"))
        })
        .await
    }

    pub(super) async fn top_events_impl(&self, limit: usize) -> Result<Vec<Event>, RepositoryError> {
        let limit = usize_to_i64_limit(limit, "top_events")?;
        self.run("top_events", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM events
                     ORDER BY helpful DESC, created_at DESC, rowid DESC
                     LIMIT ?1",
                    EVENT_COLUMNS
                ))
                .map_err(sql_err("top_events"))?;
            let rows = stmt
                .query_map(params![limit], |row| event_from_row(row, 0))
                .map_err(sql_err("top_events"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("top_events"))
        })
        .await
    }

    pub(super) async fn get_event_impl(&self, id: &str) -> Result<Option<Event>, RepositoryError> {
        let id = id.to_string();
        self.run("get_event", move |conn| load_event(conn, &id)).await
    }

    pub(super) async fn create_event_impl(
        &self,
        event: NewEvent,
        proposer_id: Option<&str>,
    ) -> Result<Event, RepositoryError> {
        let proposer_id = proposer_id.map(str::to_string);
        self.run("create_event", move |conn| {
            let id = new_id();
            insert_event(conn, &id, &event, proposer_id.as_deref())?;
            load_event(conn, &id)?
                .ok_or_else(|| RepositoryError::storage("create_event", "inserted event vanished"))
        })
        .await
    }

    pub(super) async fn delete_event_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("delete_event", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("delete_event"))?;
            for kind in ActionKind::ALL
                .into_iter()
                .filter(|kind| kind.target() == TargetKind::Event)
            {
                tx.execute(
                    "DELETE FROM action_records WHERE action_kind = ?1 AND target_id = ?2",
                    params![kind.as_str(), id],
                )
                .map_err(sql_err("delete_event"))?;
            }
            tx.execute(
                "DELETE FROM event_participation WHERE event_id = ?1",
                params![id],
            )
            .map_err(sql_err("delete_event"))?;
            let deleted = tx
                .execute("DELETE FROM events WHERE id = ?1", params![id])
                .map_err(sql_err("delete_event"))?;
            tx.commit().map_err(sql_err("delete_event"))?;
            Ok(deleted > 0)
        })
        .await
    }

    pub(super) async fn propose_event_impl(
        &self,
        event: NewEvent,
        proposer_id: &str,
    ) -> Result<PendingEvent, RepositoryError> {
        let proposer_id = proposer_id.to_string();
        self.run("propose_event", move |conn| {
            let id = new_id();
            conn.execute(
                &format!(
                    "INSERT INTO pending_events ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    PENDING_EVENT_COLUMNS
                ),
                params![
                    id,
                    event.title_bn,
                    event.title_en,
                    event.description_bn,
                    event.description_en,
                    event.category,
                    event.date,
                    event.location,
                    event.image_url,
                    event.volunteers,
                    proposer_id,
                    now_millis()
                ],
            )
            .map_err(sql_err("propose_event"))?;
            conn.query_row(
                &format!("SELECT {} FROM pending_events WHERE id = ?1", PENDING_EVENT_COLUMNS),
                params![id],
                pending_event_from_row,
            )
            .map_err(sql_err("propose_event"))
        })
        .await
    }

    pub(super) async fn list_pending_events_impl(
        &self,
    ) -> Result<Vec<PendingEvent>, RepositoryError> {
        self.run("list_pending_events", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM pending_events ORDER BY created_at DESC, rowid DESC",
                    PENDING_EVENT_COLUMNS
                ))
                .map_err(sql_err("list_pending_events"))?;
            let rows = stmt
                .query_map([], pending_event_from_row)
                .map_err(sql_err("list_pending_events"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_pending_events"))
        })
        .await
    }

    pub(super) async fn approve_pending_event_impl(
        &self,
        id: &str,
    ) -> Result<Event, RepositoryError> {
        let id = id.to_string();
        self.run("approve_pending_event", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("approve_pending_event"))?;

            let pending = tx
                .query_row(
                    &format!("SELECT {} FROM pending_events WHERE id = ?1", PENDING_EVENT_COLUMNS),
                    params![id],
                    pending_event_from_row,
                )
                .optional()
                .map_err(sql_err("approve_pending_event"))?
                .ok_or_else(|| RepositoryError::not_found("Pending event not found"))?;

            let event = NewEvent {
                title_bn: pending.title_bn,
                title_en: pending.title_en,
                description_bn: pending.description_bn,
                description_en: pending.description_en,
                category: pending.category,
                date: pending.date,
                location: pending.location,
                image_url: pending.image_url,
                volunteers: pending.volunteers,
                going: 0,
                helpful: 0,
            };
            // The published event keeps the proposal's id.
            insert_event(&tx, &pending.id, &event, Some(&pending.proposer_id))?;
            tx.execute("DELETE FROM pending_events WHERE id = ?1", params![id])
                .map_err(sql_err("approve_pending_event"))?;

            let published = load_event(&tx, &pending.id)?.ok_or_else(|| {
                RepositoryError::storage("approve_pending_event", "published event vanished")
            })?;
            tx.commit().map_err(sql_err("approve_pending_event"))?;
            info!(event_id = %published.id, "Published proposed event");
            Ok(published)
        })
        .await
    }

    pub(super) async fn reject_pending_event_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("reject_pending_event", move |conn| {
            let deleted = conn
                .execute("DELETE FROM pending_events WHERE id = ?1", params![id])
                .map_err(sql_err("reject_pending_event"))?;
            Ok(deleted > 0)
        })
        .await
    }
}
