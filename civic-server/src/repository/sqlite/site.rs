//! Editable site pages and the public contact form.
//!
//! `about_us` and `contact_info` each hold at most one row (`id = 1`).

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::super::RepositoryError;
use super::{new_id, now_millis, sql_err, timestamp, SqliteRepository};
use crate::model::{
    AboutUs, AboutUsContent, ContactInfo, ContactInfoContent, ContactSubmission,
    NewContactSubmission,
};

const ABOUT_COLUMNS: &str = "title_en, title_bn, content_en, content_bn, mission_en, mission_bn, \
     vision_en, vision_bn, values_en, values_bn, image_url, updated_at";

const CONTACT_INFO_COLUMNS: &str = "title_en, title_bn, address_en, address_bn, phone, email, \
     website, office_hours_en, office_hours_bn, map_embed, social_media, updated_at";

const SUBMISSION_COLUMNS: &str = "id, name, email, subject, message, status, created_at";

fn about_from_row(row: &Row<'_>) -> rusqlite::Result<AboutUs> {
    Ok(AboutUs {
        content: AboutUsContent {
            title_en: row.get(0)?,
            title_bn: row.get(1)?,
            content_en: row.get(2)?,
            content_bn: row.get(3)?,
            mission_en: row.get(4)?,
            mission_bn: row.get(5)?,
            vision_en: row.get(6)?,
            vision_bn: row.get(7)?,
            values_en: row.get(8)?,
            values_bn: row.get(9)?,
            image_url: row.get(10)?,
        },
        updated_at: timestamp(row, 11)?,
    })
}

fn contact_info_from_row(row: &Row<'_>) -> rusqlite::Result<ContactInfo> {
    Ok(ContactInfo {
        content: ContactInfoContent {
            title_en: row.get(0)?,
            title_bn: row.get(1)?,
            address_en: row.get(2)?,
            address_bn: row.get(3)?,
            phone: row.get(4)?,
            email: row.get(5)?,
            website: row.get(6)?,
            office_hours_en: row.get(7)?,
            office_hours_bn: row.get(8)?,
            map_embed: row.get(9)?,
            social_media: row.get(10)?,
        },
        updated_at: timestamp(row, 11)?,
    })
}

fn load_about(conn: &Connection) -> Result<Option<AboutUs>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM about_us WHERE id = 1", ABOUT_COLUMNS),
        [],
        about_from_row,
    )
    .optional()
    .map_err(sql_err("get_about"))
}

fn load_contact_info(conn: &Connection) -> Result<Option<ContactInfo>, RepositoryError> {
    conn.query_row(
        &format!("SELECT {} FROM contact_info WHERE id = 1", CONTACT_INFO_COLUMNS),
        [],
        contact_info_from_row,
    )
    .optional()
    .map_err(sql_err("get_contact_info"))
}

impl SqliteRepository {
    pub(super) async fn get_about_impl(&self) -> Result<Option<AboutUs>, RepositoryError> {
        self.run("get_about", |conn| load_about(conn)).await
    }

    pub(super) async fn upsert_about_impl(
        &self,
        content: AboutUsContent,
    ) -> Result<AboutUs, RepositoryError> {
        self.run("upsert_about", move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO about_us (id, {})
                     VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                     ON CONFLICT(id) DO UPDATE SET
                         title_en = excluded.title_en,
                         title_bn = excluded.title_bn,
                         content_en = excluded.content_en,
                         content_bn = excluded.content_bn,
                         mission_en = excluded.mission_en,
                         mission_bn = excluded.mission_bn,
                         vision_en = excluded.vision_en,
                         vision_bn = excluded.vision_bn,
                         values_en = excluded.values_en,
                         values_bn = excluded.values_bn,
                         image_url = excluded.image_url,
                         updated_at = excluded.updated_at",
                    ABOUT_COLUMNS
                ),
                params![
                    content.title_en,
                    content.title_bn,
                    content.content_en,
                    content.content_bn,
                    content.mission_en,
                    content.mission_bn,
                    content.vision_en,
                    content.vision_bn,
                    content.values_en,
                    content.values_bn,
                    content.image_url,
                    now_millis()
                ],
            )
            .map_err(sql_err("upsert_about"))?;
            info!("Updated about page");
            load_about(conn)?
                .ok_or_else(|| RepositoryError::storage("upsert_about", "about row vanished"))
        })
        .await
    }

    pub(super) async fn get_contact_info_impl(&self) -> Result<Option<ContactInfo>, RepositoryError> {
        self.run("get_contact_info", |conn| load_contact_info(conn))
            .await
    }

    pub(super) async fn upsert_contact_info_impl(
        &self,
        content: ContactInfoContent,
    ) -> Result<ContactInfo, RepositoryError> {
        self.run("upsert_contact_info", move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO contact_info (id, {})
                     VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                     ON CONFLICT(id) DO UPDATE SET
                         title_en = excluded.title_en,
                         title_bn = excluded.title_bn,
                         address_en = excluded.address_en,
                         address_bn = excluded.address_bn,
                         phone = excluded.phone,
                         email = excluded.email,
                         website = excluded.website,
                         office_hours_en = excluded.office_hours_en,
                         office_hours_bn = excluded.office_hours_bn,
                         map_embed = excluded.map_embed,
                         social_media = excluded.social_media,
                         updated_at = excluded.updated_at",
                    CONTACT_INFO_COLUMNS
                ),
                params![
                    content.title_en,
                    content.title_bn,
                    content.address_en,
                    content.address_bn,
                    content.phone,
                    content.email,
                    content.website,
                    content.office_hours_en,
                    content.office_hours_bn,
                    content.map_embed,
                    content.social_media,
                    now_millis()
                ],
            )
            .map_err(sql_err("upsert_contact_info"))?;
            info!("Updated contact page");
            load_contact_info(conn)?.ok_or_else(|| {
                RepositoryError::storage("upsert_contact_info", "contact row vanished")
            })
        })
        .await
    }

    pub(super) async fn submit_contact_impl(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        self.run("submit_contact", move |conn| {
            let id = new_id();
            conn.execute(
                &format!(
                    "INSERT INTO contact_submissions ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, 'new', ?6)",
                    SUBMISSION_COLUMNS
                ),
                params![
                    id,
                    submission.name,
                    submission.email,
                    submission.subject,
                    submission.message,
                    now_millis()
                ],
            )
            .map_err(sql_err("submit_contact"))?;
            conn.query_row(
                &format!("SELECT {} FROM contact_submissions WHERE id = ?1", SUBMISSION_COLUMNS),
                params![id],
                |row| {
                    Ok(ContactSubmission {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        subject: row.get(3)?,
                        message: row.get(4)?,
                        status: row.get(5)?,
                        created_at: timestamp(row, 6)?,
                    })
                },
            )
            .map_err(sql_err("submit_contact"))
        })
        .await
    }
}
