//! Domain services used by the GraphQL resolvers

pub mod links;

pub use links::{FeedArgs, FeedPage, LinkService, UserId};
