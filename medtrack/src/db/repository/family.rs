use chrono::Utc;
use libsql::{params, Connection};
use nanoid::nanoid;

use crate::error::Result;
use crate::models::{FamilyLink, LinkedAccount};

pub struct FamilyRepository;

impl FamilyRepository {
    pub async fn exists(
        conn: &Connection,
        primary_user_id: &str,
        observer_user_id: &str,
    ) -> Result<bool> {
        let mut rows = conn
            .query(
                "SELECT 1 FROM family_links WHERE primary_user_id = ?1 AND observer_user_id = ?2 LIMIT 1",
                params![primary_user_id, observer_user_id],
            )
            .await?;

        Ok(rows.next().await?.is_some())
    }

    pub async fn create(
        conn: &Connection,
        primary_user_id: &str,
        observer_user_id: &str,
    ) -> Result<FamilyLink> {
        let link = FamilyLink {
            id: nanoid!(),
            primary_user_id: primary_user_id.to_string(),
            observer_user_id: observer_user_id.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            r#"
            INSERT INTO family_links (id, primary_user_id, observer_user_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                link.id.clone(),
                primary_user_id,
                observer_user_id,
                link.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(link)
    }

    /// Duplicate links yield duplicate entries.
    pub async fn observers_of(
        conn: &Connection,
        primary_user_id: &str,
    ) -> Result<Vec<LinkedAccount>> {
        let rows = conn
            .query(
                r#"
                SELECT u.id, u.name, u.age
                FROM family_links f
                JOIN users u ON u.id = f.observer_user_id
                WHERE f.primary_user_id = ?1
                ORDER BY f.created_at ASC
                "#,
                params![primary_user_id],
            )
            .await?;

        Self::collect(rows).await
    }

    pub async fn primaries_of(
        conn: &Connection,
        observer_user_id: &str,
    ) -> Result<Vec<LinkedAccount>> {
        let rows = conn
            .query(
                r#"
                SELECT u.id, u.name, u.age
                FROM family_links f
                JOIN users u ON u.id = f.primary_user_id
                WHERE f.observer_user_id = ?1
                ORDER BY f.created_at ASC
                "#,
                params![observer_user_id],
            )
            .await?;

        Self::collect(rows).await
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<LinkedAccount>> {
        let mut accounts = Vec::new();
        while let Some(row) = rows.next().await? {
            accounts.push(LinkedAccount {
                user_id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
            });
        }
        Ok(accounts)
    }
}
