//! Users repository
//!
//! Users are created by the signup flow living outside this service; here
//! they are looked up for ownership and relation resolution.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use crate::error::LinkResult;

use super::sqlite_helpers::{decode_err, now_iso8601, str_to_datetime};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for UserRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let created_str: String = row.try_get("created_at")?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: str_to_datetime(&created_str).map_err(decode_err)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateUser) -> LinkResult<UserRecord> {
        let result = sqlx::query("INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)")
            .bind(&input.name)
            .bind(&input.email)
            .bind(now_iso8601())
            .execute(&self.pool)
            .await?;

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, created_at FROM users WHERE id = ?1",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Load users by id in one query. Unknown ids are absent from the map.
    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, UserRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT id, name, email, created_at FROM users WHERE id IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, UserRecord>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Voters for each of `link_ids`, in vote order. Every requested link
    /// gets an entry, empty when nobody voted.
    pub async fn voters_for_links(
        &self,
        link_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<UserRecord>>, sqlx::Error> {
        let mut result: HashMap<i32, Vec<UserRecord>> =
            link_ids.iter().map(|id| (*id, Vec::new())).collect();

        if link_ids.is_empty() {
            return Ok(result);
        }

        let placeholders: Vec<String> = (1..=link_ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            r#"
            SELECT votes.link_id AS link_id, users.id AS id, users.name AS name,
                   users.email AS email, users.created_at AS created_at
            FROM votes
            JOIN users ON users.id = votes.user_id
            WHERE votes.link_id IN ({})
            ORDER BY votes.created_at, votes.rowid
            "#,
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for id in link_ids {
            query = query.bind(*id);
        }

        for row in query.fetch_all(&self.pool).await? {
            let link_id: i32 = row.try_get("link_id")?;
            let user = UserRecord::from_row(&row)?;
            if let Some(voters) = result.get_mut(&link_id) {
                voters.push(user);
            }
        }

        Ok(result)
    }
}
