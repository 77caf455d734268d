//! Event participations and the certificate flags stored on them.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::super::RepositoryError;
use super::events::{event_from_row, EVENT_COLUMNS, EVENT_COLUMN_COUNT};
use super::users::{user_from_row, user_select};
use super::{parse_column, qualify, sql_err, timestamp, SqliteRepository};
use crate::model::{FinishedEvent, Participation, ParticipationDetails};

const PARTICIPATION_COLUMNS: &str = "id, event_id, user_id, participation_type, \
     certificate_generated, certificate_url, created_at";

const PARTICIPATION_COLUMN_COUNT: usize = 7;

fn participation_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Participation> {
    Ok(Participation {
        id: row.get(offset)?,
        event_id: row.get(offset + 1)?,
        user_id: row.get(offset + 2)?,
        participation_type: parse_column(row, offset + 3)?,
        certificate_generated: row.get(offset + 4)?,
        certificate_url: row.get(offset + 5)?,
        created_at: timestamp(row, offset + 6)?,
    })
}

fn load_participation(
    conn: &Connection,
    id: &str,
) -> Result<Option<Participation>, RepositoryError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM event_participation WHERE id = ?1",
            PARTICIPATION_COLUMNS
        ),
        params![id],
        |row| participation_from_row(row, 0),
    )
    .optional()
    .map_err(sql_err("get_participation"))
}

impl SqliteRepository {
    pub(super) async fn finished_participations_impl(
        &self,
        user_id: &str,
        today: &str,
    ) -> Result<Vec<FinishedEvent>, RepositoryError> {
        let user_id = user_id.to_string();
        let today = today.to_string();
        self.run("finished_participations", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {}, {}
                     FROM event_participation p
                     JOIN events e ON e.id = p.event_id
                     WHERE p.user_id = ?1 AND e.date < ?2
                     ORDER BY e.date DESC, p.created_at DESC, p.rowid DESC",
                    qualify(EVENT_COLUMNS, "e"),
                    qualify(PARTICIPATION_COLUMNS, "p")
                ))
                .map_err(sql_err("finished_participations"))?;
            let rows = stmt
                .query_map(params![user_id, today], |row| {
                    Ok(FinishedEvent {
                        event: event_from_row(row, 0)?,
                        participation: participation_from_row(row, EVENT_COLUMN_COUNT)?,
                    })
                })
                .map_err(sql_err("finished_participations"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("finished_participations"))
        })
        .await
    }

    pub(super) async fn get_participation_details_impl(
        &self,
        id: &str,
    ) -> Result<Option<ParticipationDetails>, RepositoryError> {
        let id = id.to_string();
        self.run("get_participation_details", move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {}, {}, {}
                     FROM event_participation p
                     JOIN events e ON e.id = p.event_id
                     JOIN users u ON u.id = p.user_id
                     WHERE p.id = ?1",
                    qualify(PARTICIPATION_COLUMNS, "p"),
                    qualify(EVENT_COLUMNS, "e"),
                    user_select("u")
                ),
                params![id],
                |row| {
                    Ok(ParticipationDetails {
                        participation: participation_from_row(row, 0)?,
                        event: event_from_row(row, PARTICIPATION_COLUMN_COUNT)?,
                        user: user_from_row(row, PARTICIPATION_COLUMN_COUNT + EVENT_COLUMN_COUNT)?,
                    })
                },
            )
            .optional()
            .map_err(sql_err("get_participation_details"))
        })
        .await
    }

    pub(super) async fn mark_certificate_generated_impl(
        &self,
        id: &str,
        certificate_url: &str,
    ) -> Result<Participation, RepositoryError> {
        let id = id.to_string();
        let certificate_url = certificate_url.to_string();
        self.run("mark_certificate_generated", move |conn| {
            let updated = conn
                .execute(
                    "UPDATE event_participation
                     SET certificate_generated = 1, certificate_url = ?2
                     WHERE id = ?1",
                    params![id, certificate_url],
                )
                .map_err(sql_err("mark_certificate_generated"))?;
            if updated == 0 {
                return Err(RepositoryError::not_found("Participation not found"));
            }
            let participation = load_participation(conn, &id)?.ok_or_else(|| {
                RepositoryError::storage("mark_certificate_generated", "participation vanished")
            })?;
            info!(
                participation_id = %participation.id,
                event_id = %participation.event_id,
                "Certificate generated"
            );
            Ok(participation)
        })
        .await
    }
}
