use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Accounts
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            age INTEGER,
            role TEXT NOT NULL,
            credential_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        -- Primary/observer links
        CREATE TABLE IF NOT EXISTS family_links (
            id TEXT PRIMARY KEY,
            primary_user_id TEXT NOT NULL,
            observer_user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (primary_user_id) REFERENCES users(id),
            FOREIGN KEY (observer_user_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_family_links_primary ON family_links(primary_user_id);
        CREATE INDEX IF NOT EXISTS idx_family_links_observer ON family_links(observer_user_id);

        -- Shared course attributes
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            patient_name TEXT NOT NULL,
            patient_age INTEGER,
            owner_user_id TEXT,
            drug_names TEXT NOT NULL DEFAULT '[]',
            facility TEXT,
            notes_payload TEXT NOT NULL DEFAULT 'null',
            start_date TEXT NOT NULL,
            duration_days INTEGER NOT NULL,
            dose_times TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_courses_patient ON courses(patient_name);
        CREATE INDEX IF NOT EXISTS idx_courses_owner ON courses(owner_user_id);

        -- One row per dose-day
        CREATE TABLE IF NOT EXISTS medication_records (
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL,
            scan_date TEXT NOT NULL,
            is_expansion_copy INTEGER NOT NULL DEFAULT 0,
            parent_record_id TEXT,
            taken INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY (course_id) REFERENCES courses(id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_course ON medication_records(course_id);
        CREATE INDEX IF NOT EXISTS idx_records_scan_date ON medication_records(scan_date);

        -- Inbox
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            recipient_user_id TEXT NOT NULL,
            message TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'medication',
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_user_id, is_read);

        CREATE TABLE IF NOT EXISTS notification_settings (
            user_id TEXT PRIMARY KEY,
            telegram_chat_id TEXT,
            telegram_enabled INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn).await.unwrap();
        init_schema(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                (),
            )
            .await
            .unwrap();
        let mut tables = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            tables.push(row.get::<String>(0).unwrap());
        }

        assert_eq!(
            tables,
            vec![
                "courses",
                "family_links",
                "medication_records",
                "notification_settings",
                "notifications",
                "users",
            ]
        );
    }

    #[tokio::test]
    async fn test_records_reference_courses() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();
        init_schema(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT \"table\", \"from\" FROM pragma_foreign_key_list('medication_records')",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().expect("foreign key present");
        assert_eq!(row.get::<String>(0).unwrap(), "courses");
        assert_eq!(row.get::<String>(1).unwrap(), "course_id");
    }
}
