use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::super::RepositoryError;
use super::{new_id, now_millis, parse_column, sql_err, timestamp, usize_to_i64_limit, SqliteRepository};
use crate::action::ActionKind;
use crate::model::{NewProject, Project, ProjectStatus};

pub(super) const PROJECT_COLUMNS: &str = "id, title_bn, title_en, description_bn, description_en, \
     category, budget, status, image_url, upvotes, created_at";

pub(super) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        title_bn: row.get(1)?,
        title_en: row.get(2)?,
        description_bn: row.get(3)?,
        description_en: row.get(4)?,
        category: row.get(5)?,
        budget: row.get(6)?,
        status: parse_column(row, 7)?,
        image_url: row.get(8)?,
        upvotes: row.get(9)?,
        created_at: timestamp(row, 10)?,
    })
}

pub(super) fn load_project(conn: &Connection, id: &str) -> Result<Option<Project>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
        params![id],
        project_from_row,
    )
    .optional()
    .map_err(sql_err("get_project"))
}

impl SqliteRepository {
    pub(super) async fn list_projects_impl(&self) -> Result<Vec<Project>, RepositoryError> {
        self.run("list_projects", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
                    PROJECT_COLUMNS
                ))
                .map_err(sql_err("list_projects"))?;
            let rows = stmt
                .query_map([], project_from_row)
                .map_err(sql_err("list_projects"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_projects"))
        })
        .await
    }

    pub(super) async fn top_projects_impl(&self, limit: usize) -> Result<Vec<Project>, RepositoryError> {
        let limit = usize_to_i64_limit(limit, "top_projects")?;
        self.run("top_projects", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM projects
                     ORDER BY upvotes DESC, created_at DESC, rowid DESC
                     LIMIT ?1",
                    PROJECT_COLUMNS
                ))
                .map_err(sql_err("top_projects"))?;
            let rows = stmt
                .query_map(params![limit], project_from_row)
                .map_err(sql_err("top_projects"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("top_projects"))
        })
        .await
    }

    pub(super) async fn get_project_impl(&self, id: &str) -> Result<Option<Project>, RepositoryError> {
        let id = id.to_string();
        self.run("get_project", move |conn| load_project(conn, &id))
            .await
    }

    pub(super) async fn create_project_impl(
        &self,
        project: NewProject,
    ) -> Result<Project, RepositoryError> {
        self.run("create_project", move |conn| {
            let id = new_id();
            conn.execute(
                &format!(
                    "INSERT INTO projects ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    PROJECT_COLUMNS
                ),
                params![
                    id,
                    project.title_bn,
                    project.title_en,
                    project.description_bn,
                    project.description_en,
                    project.category,
                    project.budget,
                    project.status.as_str(),
                    project.image_url,
                    project.upvotes,
                    now_millis()
                ],
            )
            .map_err(sql_err("create_project"))?;
            load_project(conn, &id)?
                .ok_or_else(|| RepositoryError::storage("create_project", "inserted project vanished"))
        })
        .await
    }

    pub(super) async fn delete_project_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("delete_project", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("delete_project"))?;
            tx.execute(
                "DELETE FROM action_records WHERE action_kind = ?1 AND target_id = ?2",
                params![ActionKind::ProjectUpvote.as_str(), id],
            )
            .map_err(sql_err("delete_project"))?;
            let deleted = tx
                .execute("DELETE FROM projects WHERE id = ?1", params![id])
                .map_err(sql_err("delete_project"))?;
            tx.commit().map_err(sql_err("delete_project"))?;
            Ok(deleted > 0)
        })
        .await
    }

    pub(super) async fn update_project_status_impl(
        &self,
        id: &str,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError> {
        let id = id.to_string();
        self.run("update_project_status", move |conn| {
            let updated = conn
                .execute(
                    "UPDATE projects SET status = ?2 WHERE id = ?1",
                    params![id, status.as_str()],
                )
                .map_err(sql_err("update_project_status"))?;
            if updated == 0 {
                return Ok(None);
            }
            load_project(conn, &id)
        })
        .await
    }
}
