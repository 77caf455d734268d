//! Notifications and per-user read receipts.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::super::RepositoryError;
use super::{new_id, now_millis, parse_column, qualify, sql_err, timestamp, SqliteRepository};
use crate::model::{NewNotification, Notification, TargetType, UserNotification};

const NOTIFICATION_COLUMNS: &str = "id, title_bn, title_en, message_bn, message_en, author_id, \
     target_type, target_thana, is_active, created_at";

const NOTIFICATION_COLUMN_COUNT: usize = 10;

/// Active and either countrywide or aimed at the thana bound to `?1`.
const VISIBLE_IN_THANA: &str = "n.is_active = 1 \
     AND (n.target_type = 'countrywide' OR (n.target_type = 'thana' AND n.target_thana = ?1))";

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        title_bn: row.get(1)?,
        title_en: row.get(2)?,
        message_bn: row.get(3)?,
        message_en: row.get(4)?,
        author_id: row.get(5)?,
        target_type: parse_column(row, 6)?,
        target_thana: row.get(7)?,
        is_active: row.get(8)?,
        created_at: timestamp(row, 9)?,
    })
}

fn load_notification(
    conn: &Connection,
    id: &str,
) -> Result<Option<Notification>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS),
        params![id],
        notification_from_row,
    )
    .optional()
    .map_err(sql_err("get_notification"))
}

impl SqliteRepository {
    pub(super) async fn notifications_for_user_impl(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<Vec<UserNotification>, RepositoryError> {
        let user_id = user_id.to_string();
        let thana = thana.to_string();
        self.run("notifications_for_user", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {},
                            EXISTS(SELECT 1 FROM notification_reads r
                                   WHERE r.notification_id = n.id AND r.user_id = ?2)
                     FROM notifications n
                     WHERE {}
                     ORDER BY n.created_at DESC, n.rowid DESC",
                    qualify(NOTIFICATION_COLUMNS, "n"),
                    VISIBLE_IN_THANA
                ))
                .map_err(sql_err("notifications_for_user"))?;
            let rows = stmt
                .query_map(params![thana, user_id], |row| {
                    Ok(UserNotification {
                        notification: notification_from_row(row)?,
                        is_read: row.get(NOTIFICATION_COLUMN_COUNT)?,
                    })
                })
                .map_err(sql_err("notifications_for_user"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("notifications_for_user"))
        })
        .await
    }

    pub(super) async fn list_notifications_impl(
        &self,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.run("list_notifications", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM notifications ORDER BY created_at DESC, rowid DESC",
                    NOTIFICATION_COLUMNS
                ))
                .map_err(sql_err("list_notifications"))?;
            let rows = stmt
                .query_map([], notification_from_row)
                .map_err(sql_err("list_notifications"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_notifications"))
        })
        .await
    }

    pub(super) async fn create_notification_impl(
        &self,
        notification: NewNotification,
        author_id: &str,
    ) -> Result<Notification, RepositoryError> {
        let author_id = author_id.to_string();
        self.run("create_notification", move |conn| {
            let target_thana = match notification.target_type {
                TargetType::Countrywide => None,
                TargetType::Thana => notification.target_thana,
            };
            let id = new_id();
            conn.execute(
                &format!(
                    "INSERT INTO notifications ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
                    NOTIFICATION_COLUMNS
                ),
                params![
                    id,
                    notification.title_bn,
                    notification.title_en,
                    notification.message_bn,
                    notification.message_en,
                    author_id,
                    notification.target_type.as_str(),
                    target_thana,
                    now_millis()
                ],
            )
            .map_err(sql_err("create_notification"))?;
            load_notification(conn, &id)?.ok_or_else(|| {
                RepositoryError::storage("create_notification", "inserted notification vanished")
            })
        })
        .await
    }

    pub(super) async fn mark_notification_read_impl(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        let notification_id = notification_id.to_string();
        let user_id = user_id.to_string();
        self.run("mark_notification_read", move |conn| {
            if load_notification(conn, &notification_id)?.is_none() {
                return Err(RepositoryError::not_found("Notification not found"));
            }
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO notification_reads (id, notification_id, user_id, read_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![new_id(), notification_id, user_id, now_millis()],
                )
                .map_err(sql_err("mark_notification_read"))?;
            Ok(inserted > 0)
        })
        .await
    }

    pub(super) async fn mark_all_notifications_read_impl(
        &self,
        user_id: &str,
        thana: &str,
    ) -> Result<usize, RepositoryError> {
        let user_id = user_id.to_string();
        let thana = thana.to_string();
        self.run("mark_all_notifications_read", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("mark_all_notifications_read"))?;
            let ids: Vec<String> = {
                let mut stmt = tx
                    .prepare(&format!(
                        "SELECT n.id FROM notifications n
                         WHERE {}
                           AND NOT EXISTS(SELECT 1 FROM notification_reads r
                                          WHERE r.notification_id = n.id AND r.user_id = ?2)",
                        VISIBLE_IN_THANA
                    ))
                    .map_err(sql_err("mark_all_notifications_read"))?;
                let rows = stmt
                    .query_map(params![thana, user_id], |row| row.get(0))
                    .map_err(sql_err("mark_all_notifications_read"))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(sql_err("mark_all_notifications_read"))?
            };
            let read_at = now_millis();
            let mut added = 0;
            for notification_id in &ids {
                added += tx
                    .execute(
                        "INSERT OR IGNORE INTO notification_reads
                             (id, notification_id, user_id, read_at)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![new_id(), notification_id, user_id, read_at],
                    )
                    .map_err(sql_err("mark_all_notifications_read"))?;
            }
            tx.commit().map_err(sql_err("mark_all_notifications_read"))?;
            Ok(added)
        })
        .await
    }

    pub(super) async fn deactivate_notification_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("deactivate_notification", move |conn| {
            let updated = conn
                .execute(
                    "UPDATE notifications SET is_active = 0 WHERE id = ?1",
                    params![id],
                )
                .map_err(sql_err("deactivate_notification"))?;
            Ok(updated > 0)
        })
        .await
    }
}
