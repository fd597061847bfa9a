//! GraphQL schema definition
//!
//! Query and mutation roots are merged from the per-domain resolver structs
//! in `queries/` and `mutations/`.

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;
use crate::services::LinkService;

use super::loaders::{UserLoader, VotersLoader};
use super::mutations::LinkMutations;
use super::queries::LinkQueries;

/// The GraphQL schema type
pub type LinkSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(LinkQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(LinkMutations);

/// Build the GraphQL schema with all resolvers and loaders
pub fn build_schema(db: Database) -> LinkSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(LinkService::new(db.clone()))
        .data(DataLoader::new(UserLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(VotersLoader::new(db), tokio::spawn))
        .extension(Tracing)
        .finish()
}
