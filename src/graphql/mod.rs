//! GraphQL API
//!
//! This is the single API surface of the link feed. Resolvers are split
//! into `queries/` and `mutations/`; each defines a `#[derive(Default)]`
//! struct with an `#[Object]` impl, combined with `MergedObject` in
//! `schema.rs`.

pub mod auth;
pub mod helpers;
pub mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use auth::{AuthExt, AuthUser, verify_token};
pub use schema::{LinkSchema, MutationRoot, QueryRoot, build_schema};
