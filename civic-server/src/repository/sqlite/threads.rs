//! Discussion threads and their comments.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::super::RepositoryError;
use super::{new_id, now_millis, qualify, sql_err, timestamp, SqliteRepository};
use crate::action::{ActionKind, TargetKind};
use crate::model::{AuthorSummary, CommentWithAuthor, NewThread, Thread, ThreadComment, ThreadSummary};

pub(super) const THREAD_COLUMNS: &str =
    "id, title_bn, title_en, content_bn, content_en, category, author_id, likes, pinned, created_at";

const THREAD_COLUMN_COUNT: usize = 10;

const COMMENT_COLUMNS: &str = "id, thread_id, author_id, text, created_at";

const COMMENT_COLUMN_COUNT: usize = 5;

pub(super) fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        id: row.get(0)?,
        title_bn: row.get(1)?,
        title_en: row.get(2)?,
        content_bn: row.get(3)?,
        content_en: row.get(4)?,
        category: row.get(5)?,
        author_id: row.get(6)?,
        likes: row.get(7)?,
        pinned: row.get(8)?,
        created_at: timestamp(row, 9)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<ThreadComment> {
    Ok(ThreadComment {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        author_id: row.get(2)?,
        text: row.get(3)?,
        created_at: timestamp(row, 4)?,
    })
}

/// Read the `username, first_name, last_name` of a LEFT JOINed author.
fn author_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<AuthorSummary>> {
    let username: Option<String> = row.get(offset)?;
    let Some(username) = username else {
        return Ok(None);
    };
    Ok(Some(AuthorSummary {
        username,
        first_name: row.get(offset + 1)?,
        last_name: row.get(offset + 2)?,
    }))
}

pub(super) fn load_thread(conn: &Connection, id: &str) -> Result<Option<Thread>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM threads WHERE id = ?1", THREAD_COLUMNS),
        params![id],
        thread_from_row,
    )
    .optional()
    .map_err(sql_err("get_thread"))
}

impl SqliteRepository {
    pub(super) async fn list_threads_impl(&self) -> Result<Vec<ThreadSummary>, RepositoryError> {
        self.run("list_threads", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {},
                            (SELECT COUNT(*) FROM thread_comments c WHERE c.thread_id = t.id),
                            u.username, u.first_name, u.last_name
                     FROM threads t
                     LEFT JOIN users u ON u.id = t.author_id
                     ORDER BY t.pinned DESC, t.created_at DESC, t.rowid DESC",
                    qualify(THREAD_COLUMNS, "t")
                ))
                .map_err(sql_err("list_threads"))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ThreadSummary {
                        thread: thread_from_row(row)?,
                        comment_count: row.get(THREAD_COLUMN_COUNT)?,
                        author: author_from_row(row, THREAD_COLUMN_COUNT + 1)?,
                    })
                })
                .map_err(sql_err("list_threads"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_threads"))
        })
        .await
    }

    pub(super) async fn get_thread_impl(&self, id: &str) -> Result<Option<Thread>, RepositoryError> {
        let id = id.to_string();
        self.run("get_thread", move |conn| load_thread(conn, &id))
            .await
    }

    pub(super) async fn create_thread_impl(
        &self,
        thread: NewThread,
        author_id: &str,
    ) -> Result<Thread, RepositoryError> {
        let author_id = author_id.to_string();
        self.run("create_thread", move |conn| {
            let id = new_id();
            conn.execute(
                &format!(
                    "INSERT INTO threads ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8)",
                    THREAD_COLUMNS
                ),
                params![
                    id,
                    thread.title_bn,
                    thread.title_en,
                    thread.content_bn,
                    thread.content_en,
                    thread.category,
                    author_id,
                    now_millis()
                ],
            )
            .map_err(sql_err("create_thread"))?;
            load_thread(conn, &id)?
                .ok_or_else(|| RepositoryError::storage("create_thread", "inserted thread vanished"))
        })
        .await
    }

    pub(super) async fn list_comments_impl(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        let thread_id = thread_id.to_string();
        self.run("list_comments", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {}, u.username, u.first_name, u.last_name
                     FROM thread_comments c
                     LEFT JOIN users u ON u.id = c.author_id
                     WHERE c.thread_id = ?1
                     ORDER BY c.created_at DESC, c.rowid DESC",
                    qualify(COMMENT_COLUMNS, "c")
                ))
                .map_err(sql_err("list_comments"))?;
            let rows = stmt
                .query_map(params![thread_id], |row| {
                    Ok(CommentWithAuthor {
                        comment: comment_from_row(row)?,
                        author: author_from_row(row, COMMENT_COLUMN_COUNT)?,
                    })
                })
                .map_err(sql_err("list_comments"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_comments"))
        })
        .await
    }

    pub(super) async fn add_comment_impl(
        &self,
        thread_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<ThreadComment, RepositoryError> {
        let thread_id = thread_id.to_string();
        let author_id = author_id.to_string();
        let text = text.to_string();
        self.run("add_comment", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("add_comment"))?;
            if load_thread(&tx, &thread_id)?.is_none() {
                return Err(RepositoryError::not_found(TargetKind::Thread.not_found_message()));
            }
            let id = new_id();
            tx.execute(
                &format!(
                    "INSERT INTO thread_comments ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                    COMMENT_COLUMNS
                ),
                params![id, thread_id, author_id, text, now_millis()],
            )
            .map_err(sql_err("add_comment"))?;
            let comment = tx
                .query_row(
                    &format!("SELECT {} FROM thread_comments WHERE id = ?1", COMMENT_COLUMNS),
                    params![id],
                    comment_from_row,
                )
                .map_err(sql_err("add_comment"))?;
            tx.commit().map_err(sql_err("add_comment"))?;
            Ok(comment)
        })
        .await
    }

    pub(super) async fn set_thread_pinned_impl(
        &self,
        id: &str,
        pinned: bool,
    ) -> Result<Option<Thread>, RepositoryError> {
        let id = id.to_string();
        self.run("set_thread_pinned", move |conn| {
            let updated = conn
                .execute(
                    "UPDATE threads SET pinned = ?2 WHERE id = ?1",
                    params![id, pinned],
                )
                .map_err(sql_err("set_thread_pinned"))?;
            if updated == 0 {
                return Ok(None);
            }
            load_thread(conn, &id)
        })
        .await
    }

    pub(super) async fn delete_thread_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("delete_thread", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("delete_thread"))?;
            tx.execute(
                "DELETE FROM thread_comments WHERE thread_id = ?1",
                params![id],
            )
            .map_err(sql_err("delete_thread"))?;
            tx.execute(
                "DELETE FROM action_records WHERE action_kind = ?1 AND target_id = ?2",
                params![ActionKind::ThreadLike.as_str(), id],
            )
            .map_err(sql_err("delete_thread"))?;
            let deleted = tx
                .execute("DELETE FROM threads WHERE id = ?1", params![id])
                .map_err(sql_err("delete_thread"))?;
            tx.commit().map_err(sql_err("delete_thread"))?;
            Ok(deleted > 0)
        })
        .await
    }
}
