//! Application state and HTTP router construction.
//!
//! `/graphql` takes POST for operations; GET serves GraphiQL to browsers.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::header::{ACCEPT, ALLOW, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::graphql::{LinkSchema, verify_token};

/// Shared state for HTTP handlers (GraphQL, health routes).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: LinkSchema,
}

/// Build the full Axum router: /graphql, health probes and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .merge(api::health::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    // An invalid token leaves the request anonymous; resolvers that need a
    // caller reject it themselves.
    match extract_token(&headers) {
        Some(token) => match verify_token(token, &state.config.jwt_secret) {
            Ok(user) => {
                tracing::debug!(user_id = user.user_id, "Auth successful");
                request = request.data(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed");
            }
        },
        None => tracing::debug!("No auth token in request headers"),
    }

    state.schema.execute(request).await.into()
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/html"))
}

/// GraphiQL for browsers; other GET clients are told to POST
async fn graphiql(headers: HeaderMap) -> Response {
    if accepts_html(&headers) {
        let page = GraphiQLSource::build()
            .endpoint("/graphql")
            .title("linkfeed")
            .finish();
        return Html(page).into_response();
    }

    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, "POST")],
        axum::Json(serde_json::json!({
            "error": "Send GraphQL operations as POST /graphql with a JSON body"
        })),
    )
        .into_response()
}
