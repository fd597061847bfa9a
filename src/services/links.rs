//! Link operations: feed, lookup, post, update, delete and vote.
//!
//! The caller is always an explicit argument. `None` means the request was
//! anonymous; every mutation rejects it before touching the store.

use serde::Serialize;
use tracing::{info, warn};

use crate::db::{CreateLink, Database, FeedOrder, FeedQuery, LinkOrder, LinkRecord, UpdateLink};
use crate::error::{LinkError, LinkResult};

/// Authenticated user id, as established by token verification
pub type UserId = i32;

/// Arguments of a feed request.
///
/// Field order matters: it is the key order of the serialized feed id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<FeedOrder>>,
}

impl FeedArgs {
    /// Opaque identifier derived from the request arguments
    pub fn feed_id(&self) -> String {
        let args = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("main-feed: {}", args)
    }

    /// Sort keys of every ordering object, in list order
    pub fn sort_keys(&self) -> Vec<LinkOrder> {
        self.order_by
            .iter()
            .flatten()
            .flat_map(FeedOrder::keys)
            .collect()
    }
}

/// One page of the feed
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub links: Vec<LinkRecord>,
    pub count: i64,
    pub id: String,
}

fn require_caller(caller: Option<UserId>) -> LinkResult<UserId> {
    caller.ok_or_else(LinkError::not_authenticated)
}

#[derive(Clone)]
pub struct LinkService {
    db: Database,
}

impl LinkService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn feed(&self, args: FeedArgs) -> LinkResult<FeedPage> {
        if args.skip.is_some_and(|s| s < 0) {
            return Err(LinkError::BadRequest("skip must not be negative".into()));
        }
        if args.take.is_some_and(|t| t < 0) {
            return Err(LinkError::BadRequest("take must not be negative".into()));
        }

        let query = FeedQuery::new()
            .filter(args.filter.as_deref())
            .order_by(&args.sort_keys())
            .skip(args.skip.map(i64::from))
            .take(args.take.map(i64::from));

        let (links, count) = self.db.links().feed(&query).await?;

        tracing::debug!(
            returned = links.len(),
            count = count,
            filter = ?args.filter,
            "Feed resolved"
        );

        Ok(FeedPage {
            links,
            count,
            id: args.feed_id(),
        })
    }

    pub async fn find_one(&self, id: i32) -> LinkResult<LinkRecord> {
        self.db
            .links()
            .get_by_id(id)
            .await?
            .ok_or_else(|| LinkError::NotFound(format!("Couldn't find link with id {}", id)))
    }

    pub async fn post(
        &self,
        caller: Option<UserId>,
        description: String,
        url: String,
    ) -> LinkResult<LinkRecord> {
        let user_id = require_caller(caller)?;

        let result = self
            .db
            .links()
            .create(CreateLink {
                description,
                url,
                posted_by_id: user_id,
            })
            .await;

        match &result {
            Ok(link) => info!(user_id = user_id, link_id = link.id, "Link posted"),
            Err(e) => warn!(user_id = user_id, error = %e, "Link post rejected"),
        }
        result
    }

    pub async fn update_link(
        &self,
        caller: Option<UserId>,
        id: i32,
        description: String,
        url: String,
    ) -> LinkResult<LinkRecord> {
        let user_id = require_caller(caller)?;

        let result = self
            .db
            .links()
            .update(id, user_id, UpdateLink { description, url })
            .await;

        match &result {
            Ok(_) => info!(user_id = user_id, link_id = id, "Link updated"),
            Err(e) => warn!(user_id = user_id, link_id = id, error = %e, "Link update rejected"),
        }
        result
    }

    pub async fn delete_link(&self, caller: Option<UserId>, id: i32) -> LinkResult<LinkRecord> {
        let user_id = require_caller(caller)?;

        let result = self.db.links().delete(id, user_id).await;

        match &result {
            Ok(_) => info!(user_id = user_id, link_id = id, "Link deleted"),
            Err(e) => warn!(user_id = user_id, link_id = id, error = %e, "Link delete rejected"),
        }
        result
    }

    pub async fn vote(&self, caller: Option<UserId>, link_id: i32) -> LinkResult<LinkRecord> {
        let user_id = require_caller(caller)?;

        let result = self.db.links().add_vote(link_id, user_id).await;

        match &result {
            Ok(link) => info!(
                user_id = user_id,
                link_id = link_id,
                total_votes = link.total_votes,
                "Vote recorded"
            ),
            Err(e) => warn!(user_id = user_id, link_id = link_id, error = %e, "Vote rejected"),
        }
        result
    }
}
