//! GraphQL DataLoaders for batching relation queries
//!
//! When a feed page resolves `postedBy` or `voters` for every link, the
//! individual `load_one` calls made in the same tick are collected into a
//! single `IN (...)` query.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::{Database, UserRecord};

/// Loads users by id (for `Link.postedBy`)
pub struct UserLoader {
    db: Database,
}

impl UserLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for UserLoader {
    type Value = UserRecord;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(key_count = keys.len(), "Batch loading users");
        self.db.users().get_by_ids(keys).await.map_err(Arc::new)
    }
}

/// Loads the voters of links by link id (for `Link.voters`)
pub struct VotersLoader {
    db: Database,
}

impl VotersLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for VotersLoader {
    type Value = Vec<UserRecord>;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(key_count = keys.len(), "Batch loading voters");
        self.db.users().voters_for_links(keys).await.map_err(Arc::new)
    }
}
