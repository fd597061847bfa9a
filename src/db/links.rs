//! Link repository
//!
//! Every mutation runs inside one transaction and finishes with a write
//! whose WHERE clause restates its own preconditions (ownership, no
//! duplicate description/url). The reads before the write only decide
//! which error to report; they never gate the write on their own.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::{LinkError, LinkResult};

use super::query::FeedQuery;
use super::sqlite_helpers::{decode_err, now_iso8601, str_to_datetime, str_to_datetime_opt};

/// Column list for link reads, including the derived vote count
pub(crate) const LINK_COLUMNS: &str = "links.id, links.description, links.url, \
    links.created_at, links.updated_at, links.posted_by_id, \
    (SELECT COUNT(*) FROM votes WHERE votes.link_id = links.id) AS total_votes";

/// Link record from database
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: i32,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub posted_by_id: Option<i32>,
    pub total_votes: i64,
}

impl sqlx::FromRow<'_, SqliteRow> for LinkRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let created_str: String = row.try_get("created_at")?;
        let updated_str: Option<String> = row.try_get("updated_at")?;

        Ok(Self {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            url: row.try_get("url")?,
            created_at: str_to_datetime(&created_str).map_err(decode_err)?,
            updated_at: str_to_datetime_opt(updated_str.as_deref()).map_err(decode_err)?,
            posted_by_id: row.try_get("posted_by_id")?,
            total_votes: row.try_get("total_votes")?,
        })
    }
}

/// Input for creating a link
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub description: String,
    pub url: String,
    pub posted_by_id: i32,
}

/// Input for updating a link
#[derive(Debug, Clone)]
pub struct UpdateLink {
    pub description: String,
    pub url: String,
}

pub struct LinkRepository {
    pool: SqlitePool,
}

impl LinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Writers take the lock at BEGIN. A deferred reader cannot upgrade once
    // another connection has committed, and SQLite then fails with
    // SQLITE_BUSY without waiting on busy_timeout.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    /// Get a link by ID
    pub async fn get_by_id(&self, id: i32) -> LinkResult<Option<LinkRecord>> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_link(&mut conn, i64::from(id)).await?)
    }

    /// Run a feed query, returning the page and the unpaginated total
    pub async fn feed(&self, query: &FeedQuery) -> LinkResult<(Vec<LinkRecord>, i64)> {
        let links = query.fetch_all(&self.pool).await?;
        let count = query.count(&self.pool).await?;
        Ok((links, count))
    }

    /// Insert a link unless another link already uses its description or url
    pub async fn create(&self, input: CreateLink) -> LinkResult<LinkRecord> {
        let mut tx = self.begin_write().await?;

        if !user_exists(&mut tx, input.posted_by_id).await? {
            return Err(LinkError::not_authenticated());
        }

        let now = now_iso8601();
        let result = sqlx::query(
            r#"
            INSERT INTO links (description, url, created_at, updated_at, posted_by_id)
            SELECT ?1, ?2, ?3, ?3, ?4
            WHERE NOT EXISTS (
                SELECT 1 FROM links WHERE description = ?1 OR url = ?2
            )
            "#,
        )
        .bind(&input.description)
        .bind(&input.url)
        .bind(&now)
        .bind(input.posted_by_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LinkError::duplicate_link());
        }

        let record = fetch_link(&mut tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| LinkError::Internal("Failed to retrieve link after insert".into()))?;

        tx.commit().await?;
        Ok(record)
    }

    /// Replace description and url of a link owned by `owner_id`
    pub async fn update(&self, id: i32, owner_id: i32, input: UpdateLink) -> LinkResult<LinkRecord> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_link(&mut tx, i64::from(id))
            .await?
            .ok_or_else(|| LinkError::NotFound("Link does not exist".into()))?;

        if existing.posted_by_id != Some(owner_id) {
            return Err(LinkError::not_owner());
        }

        let result = sqlx::query(
            r#"
            UPDATE links SET
                description = ?1,
                url = ?2,
                updated_at = ?3
            WHERE id = ?4
              AND posted_by_id = ?5
              AND NOT EXISTS (
                  SELECT 1 FROM links other
                  WHERE other.id != ?4
                    AND (other.description = ?1 OR other.url = ?2)
              )
            "#,
        )
        .bind(&input.description)
        .bind(&input.url)
        .bind(now_iso8601())
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LinkError::duplicate_link());
        }

        let record = fetch_link(&mut tx, i64::from(id))
            .await?
            .ok_or_else(|| LinkError::Internal("Failed to retrieve link after update".into()))?;

        tx.commit().await?;
        Ok(record)
    }

    /// Delete a link owned by `owner_id`, returning the row as it was
    pub async fn delete(&self, id: i32, owner_id: i32) -> LinkResult<LinkRecord> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_link(&mut tx, i64::from(id))
            .await?
            .ok_or_else(|| LinkError::NotFound("Link does not exist".into()))?;

        if existing.posted_by_id != Some(owner_id) {
            return Err(LinkError::not_owner());
        }

        let result = sqlx::query("DELETE FROM links WHERE id = ?1 AND posted_by_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LinkError::NotFound("Link does not exist".into()));
        }

        tx.commit().await?;
        Ok(existing)
    }

    /// Record a vote by `user_id`, at most once per link
    pub async fn add_vote(&self, link_id: i32, user_id: i32) -> LinkResult<LinkRecord> {
        let mut tx = self.begin_write().await?;

        if !user_exists(&mut tx, user_id).await? {
            return Err(LinkError::not_authenticated());
        }

        if fetch_link(&mut tx, i64::from(link_id)).await?.is_none() {
            return Err(LinkError::NotFound(format!(
                "Couldn't find link with id {}",
                link_id
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO votes (link_id, user_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (link_id, user_id) DO NOTHING
            "#,
        )
        .bind(link_id)
        .bind(user_id)
        .bind(now_iso8601())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LinkError::Conflict(format!(
                "Already voted for link {}",
                link_id
            )));
        }

        let record = fetch_link(&mut tx, i64::from(link_id))
            .await?
            .ok_or_else(|| LinkError::Internal("Failed to retrieve link after vote".into()))?;

        tx.commit().await?;
        Ok(record)
    }
}

async fn fetch_link(conn: &mut SqliteConnection, id: i64) -> Result<Option<LinkRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM links WHERE links.id = ?1", LINK_COLUMNS);
    sqlx::query_as::<_, LinkRecord>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn user_exists(conn: &mut SqliteConnection, user_id: i32) -> Result<bool, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}
