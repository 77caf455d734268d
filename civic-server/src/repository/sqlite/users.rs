//! Accounts and pending registrations.
//!
//! `users` and `pending_approvals` share the profile column layout, so rows
//! move between them with a single `INSERT ... SELECT`.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::super::RepositoryError;
use super::{
    is_unique_violation, new_id, now_millis, parse_column, qualify, sql_err, timestamp,
    SqliteRepository,
};
use crate::model::{AccountProfile, NewAccount, PendingApproval, User};

/// Profile columns in the order `profile_from_row` reads them.
const PROFILE_COLUMNS: &str = "username, role, first_name, last_name, id_type, id_number, \
     building, floor, street, thana, city, postal_code, country, mobile";

const PROFILE_COLUMN_COUNT: usize = 14;

fn profile_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<AccountProfile> {
    Ok(AccountProfile {
        username: row.get(offset)?,
        role: parse_column(row, offset + 1)?,
        first_name: row.get(offset + 2)?,
        last_name: row.get(offset + 3)?,
        id_type: row.get(offset + 4)?,
        id_number: row.get(offset + 5)?,
        building: row.get(offset + 6)?,
        floor: row.get(offset + 7)?,
        street: row.get(offset + 8)?,
        thana: row.get(offset + 9)?,
        city: row.get(offset + 10)?,
        postal_code: row.get(offset + 11)?,
        country: row.get(offset + 12)?,
        mobile: row.get(offset + 13)?,
    })
}

/// `SELECT` list matching `user_from_row`, for use by other modules.
pub(super) fn user_select(alias: &str) -> String {
    qualify(&format!("id, {}, password_hash", PROFILE_COLUMNS), alias)
}

/// Read a user starting at column `offset`.
pub(super) fn user_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(offset)?,
        profile: profile_from_row(row, offset + 1)?,
        password_hash: row.get(offset + 1 + PROFILE_COLUMN_COUNT)?,
    })
}

fn pending_from_row(row: &Row<'_>) -> rusqlite::Result<PendingApproval> {
    Ok(PendingApproval {
        id: row.get(0)?,
        profile: profile_from_row(row, 1)?,
        password_hash: row.get(1 + PROFILE_COLUMN_COUNT)?,
        created_at: timestamp(row, 2 + PROFILE_COLUMN_COUNT)?,
    })
}

pub(super) fn load_user(conn: &Connection, id: &str) -> Result<Option<User>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM users u WHERE u.id = ?1", user_select("u")),
        params![id],
        |row| user_from_row(row, 0),
    )
    .optional()
    .map_err(sql_err("get_user"))
}

/// Reject a profile whose email, mobile or ID number is already taken.
///
/// Checks `users`, and `pending_approvals` too when `include_pending` is set.
fn check_unique(
    conn: &Connection,
    profile: &AccountProfile,
    include_pending: bool,
) -> Result<(), RepositoryError> {
    let checks = [
        ("username", profile.username.as_str(), "Email already exists"),
        ("mobile", profile.mobile.as_str(), "Mobile already exists"),
        ("id_number", profile.id_number.as_str(), "ID number already exists"),
    ];
    for (column, value, message) in checks {
        let taken: bool = conn
            .query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM users WHERE {} = ?1)", column),
                params![value],
                |row| row.get(0),
            )
            .map_err(sql_err("check account uniqueness"))?;
        if taken {
            return Err(RepositoryError::conflict(message));
        }
        if include_pending {
            let pending: bool = conn
                .query_row(
                    &format!(
                        "SELECT EXISTS(SELECT 1 FROM pending_approvals WHERE {} = ?1)",
                        column
                    ),
                    params![value],
                    |row| row.get(0),
                )
                .map_err(sql_err("check account uniqueness"))?;
            if pending {
                return Err(RepositoryError::conflict(message));
            }
        }
    }
    Ok(())
}

fn insert_account(
    conn: &Connection,
    table: &str,
    id: &str,
    account: &NewAccount,
    created_at: i64,
) -> Result<(), RepositoryError> {
    let p = &account.profile;
    conn.execute(
        &format!(
            "INSERT INTO {} (id, {}, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            table, PROFILE_COLUMNS
        ),
        params![
            id,
            p.username,
            p.role.as_str(),
            p.first_name,
            p.last_name,
            p.id_type,
            p.id_number,
            p.building,
            p.floor,
            p.street,
            p.thana,
            p.city,
            p.postal_code,
            p.country,
            p.mobile,
            account.password_hash,
            created_at
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            RepositoryError::conflict("Duplicate value")
        } else {
            RepositoryError::storage("insert account", e.to_string())
        }
    })?;
    Ok(())
}

// =============================================================================
// Async implementations
// =============================================================================

impl SqliteRepository {
    pub(super) async fn get_user_impl(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let id = id.to_string();
        self.run("get_user", move |conn| load_user(conn, &id)).await
    }

    pub(super) async fn get_user_by_username_impl(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let username = username.to_string();
        self.run("get_user_by_username", move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM users u WHERE u.username = ?1", user_select("u")),
                params![username],
                |row| user_from_row(row, 0),
            )
            .optional()
            .map_err(sql_err("get_user_by_username"))
        })
        .await
    }

    pub(super) async fn create_user_impl(&self, account: NewAccount) -> Result<User, RepositoryError> {
        self.run("create_user", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("create_user"))?;
            check_unique(&tx, &account.profile, false)?;
            let id = new_id();
            insert_account(&tx, "users", &id, &account, now_millis())?;
            let user = load_user(&tx, &id)?
                .ok_or_else(|| RepositoryError::storage("create_user", "inserted user vanished"))?;
            tx.commit().map_err(sql_err("create_user"))?;
            info!(user_id = %user.id, role = %user.role(), "Created account");
            Ok(user)
        })
        .await
    }

    pub(super) async fn submit_registration_impl(
        &self,
        account: NewAccount,
    ) -> Result<PendingApproval, RepositoryError> {
        self.run("submit_registration", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("submit_registration"))?;
            check_unique(&tx, &account.profile, true)?;
            let id = new_id();
            insert_account(&tx, "pending_approvals", &id, &account, now_millis())?;
            let pending = tx
                .query_row(
                    &format!(
                        "SELECT id, {}, password_hash, created_at FROM pending_approvals WHERE id = ?1",
                        PROFILE_COLUMNS
                    ),
                    params![id],
                    pending_from_row,
                )
                .map_err(sql_err("submit_registration"))?;
            tx.commit().map_err(sql_err("submit_registration"))?;
            Ok(pending)
        })
        .await
    }

    pub(super) async fn list_pending_approvals_impl(
        &self,
    ) -> Result<Vec<PendingApproval>, RepositoryError> {
        self.run("list_pending_approvals", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id, {}, password_hash, created_at FROM pending_approvals
                     ORDER BY created_at ASC, rowid ASC",
                    PROFILE_COLUMNS
                ))
                .map_err(sql_err("list_pending_approvals"))?;
            let rows = stmt
                .query_map([], pending_from_row)
                .map_err(sql_err("list_pending_approvals"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("list_pending_approvals"))
        })
        .await
    }

    pub(super) async fn approve_registration_impl(&self, id: &str) -> Result<User, RepositoryError> {
        let id = id.to_string();
        self.run("approve_registration", move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sql_err("approve_registration"))?;

            let pending = tx
                .query_row(
                    &format!(
                        "SELECT id, {}, password_hash, created_at FROM pending_approvals WHERE id = ?1",
                        PROFILE_COLUMNS
                    ),
                    params![id],
                    pending_from_row,
                )
                .optional()
                .map_err(sql_err("approve_registration"))?
                .ok_or_else(|| RepositoryError::not_found("Not found"))?;

            check_unique(&tx, &pending.profile, false)?;

            // The account keeps the registration's id and creation time.
            tx.execute(
                &format!(
                    "INSERT INTO users (id, {cols}, password_hash, created_at)
                     SELECT id, {cols}, password_hash, created_at FROM pending_approvals
                     WHERE id = ?1",
                    cols = PROFILE_COLUMNS
                ),
                params![id],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepositoryError::conflict("Duplicate value")
                } else {
                    RepositoryError::storage("approve_registration", e.to_string())
                }
            })?;
            tx.execute("DELETE FROM pending_approvals WHERE id = ?1", params![id])
                .map_err(sql_err("approve_registration"))?;

            let user = load_user(&tx, &id)?.ok_or_else(|| {
                RepositoryError::storage("approve_registration", "approved user vanished")
            })?;
            tx.commit().map_err(sql_err("approve_registration"))?;
            info!(user_id = %user.id, role = %user.role(), "Approved registration");
            Ok(user)
        })
        .await
    }

    pub(super) async fn reject_registration_impl(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        self.run("reject_registration", move |conn| {
            let deleted = conn
                .execute("DELETE FROM pending_approvals WHERE id = ?1", params![id])
                .map_err(sql_err("reject_registration"))?;
            Ok(deleted > 0)
        })
        .await
    }
}
