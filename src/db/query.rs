//! SQL query builder for the link feed
//!
//! Builds one parameterized predicate shared by the page query and the
//! count query, so `count` always describes the same rows the page was cut
//! from. Sort columns come from a closed enum, never from client strings.

use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::SqlitePool;

use super::links::{LINK_COLUMNS, LinkRecord};
use super::sqlite_helpers::escape_like;

/// Sortable link columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSortField {
    Description,
    Url,
    CreatedAt,
}

impl LinkSortField {
    /// Database column backing this field
    pub fn column(&self) -> &'static str {
        match self {
            LinkSortField::Description => "links.description",
            LinkSortField::Url => "links.url",
            LinkSortField::CreatedAt => "links.created_at",
        }
    }

    /// Field name as clients spell it
    pub fn field_name(&self) -> &'static str {
        match self {
            LinkSortField::Description => "description",
            LinkSortField::Url => "url",
            LinkSortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One `(field, direction)` sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOrder {
    pub field: LinkSortField,
    pub direction: SortDirection,
}

impl LinkOrder {
    pub fn new(field: LinkSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// One client ordering object. Each set field adds a sort key, applied in
/// the order description, url, createdAt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedOrder {
    pub description: Option<SortDirection>,
    pub url: Option<SortDirection>,
    pub created_at: Option<SortDirection>,
}

impl FeedOrder {
    pub fn keys(&self) -> Vec<LinkOrder> {
        [
            (LinkSortField::Description, self.description),
            (LinkSortField::Url, self.url),
            (LinkSortField::CreatedAt, self.created_at),
        ]
        .into_iter()
        .filter_map(|(field, direction)| direction.map(|d| LinkOrder::new(field, d)))
        .collect()
    }
}

// Serialized as `{"description":"desc","url":"asc"}`, the shape clients send.
impl Serialize for FeedOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key.field.field_name(), key.direction.as_str())?;
        }
        map.end()
    }
}

/// A query over the `links` table with filtering, sorting and pagination.
#[derive(Debug, Default)]
pub struct FeedQuery {
    where_clauses: Vec<String>,
    values: Vec<String>,
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl FeedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `text` as a case-insensitive substring of description OR url.
    /// `None` and empty strings leave the predicate empty.
    pub fn filter(mut self, text: Option<&str>) -> Self {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.values.push(format!("%{}%", escape_like(text)));
            let param = self.values.len();
            self.where_clauses.push(format!(
                r"(links.description LIKE ?{param} ESCAPE '\' OR links.url LIKE ?{param} ESCAPE '\')"
            ));
        }
        self
    }

    /// Append sort keys in the given order
    pub fn order_by(mut self, orders: &[LinkOrder]) -> Self {
        for order in orders {
            self.order_clauses
                .push(format!("{} {}", order.field.column(), order.direction.to_sql()));
        }
        self
    }

    pub fn skip(mut self, skip: Option<i64>) -> Self {
        self.offset = skip.filter(|s| *s > 0);
        self
    }

    pub fn take(mut self, take: Option<i64>) -> Self {
        self.limit = take;
        self
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Build the page query
    pub fn build_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM links{}", LINK_COLUMNS, self.where_sql());

        // id is always the final key so pages are stable across requests
        let mut order = self.order_clauses.clone();
        order.push("links.id ASC".to_string());
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        sql
    }

    /// Build the COUNT query over the same predicate, ignoring pagination
    pub fn build_count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM links{}", self.where_sql())
    }

    /// Execute the page query
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<LinkRecord>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing feed query");

        let mut query = sqlx::query_as::<_, LinkRecord>(&sql);
        for value in &self.values {
            query = query.bind(value.as_str());
        }
        query.fetch_all(pool).await
    }

    /// Execute the count query
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.values {
            query = query.bind(value.as_str());
        }
        query.fetch_one(pool).await
    }
}
