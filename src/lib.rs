//! Link feed backend
//!
//! A GraphQL API for sharing links: a filterable, sortable feed plus
//! owner-checked post/update/delete and voting. All operations are exposed
//! via GraphQL at /graphql.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
