use chrono::Utc;
use libsql::{params, Connection};
use nanoid::nanoid;

use super::parse_timestamp;
use crate::error::Result;
use crate::models::{Notification, NotificationCategory, NotificationSettings};

const NOTIFICATION_COLUMNS: &str = "id, recipient_user_id, message, category, is_read, created_at";

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(
        conn: &Connection,
        recipient_user_id: &str,
        message: &str,
        category: NotificationCategory,
    ) -> Result<Notification> {
        let notification = Notification {
            id: nanoid!(),
            recipient_user_id: recipient_user_id.to_string(),
            message: message.to_string(),
            category,
            is_read: false,
            created_at: Utc::now(),
        };

        conn.execute(
            r#"
            INSERT INTO notifications (id, recipient_user_id, message, category, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
            params![
                notification.id.clone(),
                recipient_user_id,
                message,
                category.to_string(),
                notification.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(notification)
    }

    pub async fn unread(conn: &Connection, recipient_user_id: &str) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_user_id = ?1 AND is_read = 0 ORDER BY created_at DESC"
        );
        let rows = conn.query(&sql, params![recipient_user_id]).await?;
        Self::collect(rows).await
    }

    pub async fn recent(
        conn: &Connection,
        recipient_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_user_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        );
        let rows = conn
            .query(&sql, params![recipient_user_id, i64::from(limit)])
            .await?;
        Self::collect(rows).await
    }

    pub async fn mark_read(conn: &Connection, id: &str) -> Result<bool> {
        let rows_affected = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(rows_affected > 0)
    }

    pub async fn mark_all_read(conn: &Connection, recipient_user_id: &str) -> Result<u64> {
        let rows_affected = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE recipient_user_id = ?1 AND is_read = 0",
                params![recipient_user_id],
            )
            .await?;
        Ok(rows_affected)
    }

    pub async fn get_settings(
        conn: &Connection,
        user_id: &str,
    ) -> Result<Option<NotificationSettings>> {
        let mut rows = conn
            .query(
                "SELECT user_id, telegram_chat_id, telegram_enabled, updated_at \
                 FROM notification_settings WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(NotificationSettings {
                user_id: row.get(0)?,
                telegram_chat_id: row.get(1)?,
                telegram_enabled: row.get::<i32>(2)? != 0,
                updated_at: parse_timestamp(&row.get::<String>(3)?),
            })),
            None => Ok(None),
        }
    }

    pub async fn upsert_settings(conn: &Connection, settings: &NotificationSettings) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO notification_settings (user_id, telegram_chat_id, telegram_enabled, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                telegram_chat_id = excluded.telegram_chat_id,
                telegram_enabled = excluded.telegram_enabled,
                updated_at = excluded.updated_at
            "#,
            params![
                settings.user_id.clone(),
                settings.telegram_chat_id.clone(),
                settings.telegram_enabled as i32,
                settings.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<Notification>> {
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Notification {
                id: row.get(0)?,
                recipient_user_id: row.get(1)?,
                message: row.get(2)?,
                category: row
                    .get::<String>(3)?
                    .parse()
                    .unwrap_or(NotificationCategory::System),
                is_read: row.get::<i32>(4)? != 0,
                created_at: parse_timestamp(&row.get::<String>(5)?),
            });
        }
        Ok(results)
    }
}
