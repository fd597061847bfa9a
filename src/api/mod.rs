//! HTTP routes outside GraphQL
//!
//! The primary API is GraphQL at /graphql; only probes live here.

pub mod health;
