// Conversions shared across GraphQL query/mutation modules.

use crate::db::{FeedOrder, LinkRecord, SortDirection, UserRecord};
use crate::graphql::types::{Link, LinkOrderByInput, Sort, User};

/// Clamp a database count into GraphQL's 32-bit Int
pub(crate) fn count_to_int(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

impl From<LinkRecord> for Link {
    fn from(r: LinkRecord) -> Self {
        Link {
            id: r.id,
            description: r.description,
            url: r.url,
            created_at: r.created_at,
            updated_at: r.updated_at,
            total_votes: Some(count_to_int(r.total_votes)),
            posted_by_id: r.posted_by_id,
        }
    }
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
        }
    }
}

impl From<Sort> for SortDirection {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Asc => SortDirection::Asc,
            Sort::Desc => SortDirection::Desc,
        }
    }
}

impl From<LinkOrderByInput> for FeedOrder {
    fn from(input: LinkOrderByInput) -> Self {
        FeedOrder {
            description: input.description.map(Into::into),
            url: input.url.map(Into::into),
            created_at: input.created_at.map(Into::into),
        }
    }
}
