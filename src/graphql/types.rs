//! GraphQL type definitions
//!
//! These types mirror the database records but are decorated with
//! async-graphql attributes.

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, ErrorExtensions, ID, InputObject, Result, SimpleObject};
use chrono::{DateTime, Utc};

use crate::error::LinkError;

use super::loaders::{UserLoader, VotersLoader};

/// A shared link
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Link {
    pub id: i32,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of users who voted for this link
    pub total_votes: Option<i32>,
    #[graphql(skip)]
    pub posted_by_id: Option<i32>,
}

#[ComplexObject]
impl Link {
    /// The user who posted the link
    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = self.posted_by_id else {
            return Ok(None);
        };

        let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
        let user = loader
            .load_one(user_id)
            .await
            .map_err(|e| LinkError::Internal(e.to_string()).extend())?;

        Ok(user.map(User::from))
    }

    /// Users who voted for the link, in vote order
    async fn voters(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let loader = ctx.data_unchecked::<DataLoader<VotersLoader>>();
        let voters = loader
            .load_one(self.id)
            .await
            .map_err(|e| LinkError::Internal(e.to_string()).extend())?
            .unwrap_or_default();

        Ok(voters.into_iter().map(User::from).collect())
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A page of links plus the total matching the filter
#[derive(Debug, Clone, SimpleObject)]
pub struct Feed {
    pub links: Vec<Link>,
    pub count: i32,
    pub id: Option<ID>,
}

/// Sort direction
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(rename_items = "lowercase")]
pub enum Sort {
    Asc,
    Desc,
}

/// Feed ordering; each set field adds one sort key
#[derive(InputObject, Clone, Debug, Default)]
pub struct LinkOrderByInput {
    pub description: Option<Sort>,
    pub url: Option<Sort>,
    pub created_at: Option<Sort>,
}
