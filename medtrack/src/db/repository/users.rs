use libsql::{params, Connection};

use super::parse_timestamp;
use crate::error::{MedtrackError, Result};
use crate::models::{Role, UserAccount};

const USER_COLUMNS: &str = "id, name, age, role, credential_hash, created_at";

pub struct UserRepository;

impl UserRepository {
    pub async fn create(conn: &Connection, user: &UserAccount) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO users (id, name, age, role, credential_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user.id.clone(),
                user.name.clone(),
                user.age,
                user.role.to_string(),
                user.credential_hash.clone(),
                user.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_name(conn: &Connection, name: &str) -> Result<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1");
        let mut rows = conn.query(&sql, params![name]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_role(conn: &Connection, role: Role) -> Result<Vec<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY name ASC");
        let mut rows = conn.query(&sql, params![role.to_string()]).await?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(Self::row_to_user(&row)?);
        }
        Ok(users)
    }

    fn row_to_user(row: &libsql::Row) -> Result<UserAccount> {
        let role: String = row.get(3)?;
        Ok(UserAccount {
            id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            role: role.parse().map_err(MedtrackError::Internal)?,
            credential_hash: row.get(4)?,
            created_at: parse_timestamp(&row.get::<String>(5)?),
        })
    }
}
