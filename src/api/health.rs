//! Liveness and readiness probes
//!
//! `/healthz` answers as long as the process serves requests. `/readyz`
//! answers 503 while the database is unreachable, so orchestrators stop
//! routing traffic to this instance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub ready: bool,
    /// "up" or "down"
    pub database: &'static str,
}

async fn healthz() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    if state.db.ping().await {
        return (
            StatusCode::OK,
            Json(Readiness {
                ready: true,
                database: "up",
            }),
        );
    }

    tracing::warn!("Readiness check failed: database unavailable");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(Readiness {
            ready: false,
            database: "down",
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::db::Database;
    use crate::graphql::build_schema;

    async fn state() -> AppState {
        let db = Database::connect_in_memory().await.unwrap();
        AppState {
            config: Arc::new(Config {
                host: None,
                port: 0,
                database_url: "sqlite::memory:".into(),
                database_max_connections: 1,
                jwt_secret: "test-secret".into(),
                jwt_secret_generated: false,
            }),
            schema: build_schema(db.clone()),
            db,
        }
    }

    #[tokio::test]
    async fn test_readyz_reports_database_up() {
        let (status, Json(body)) = readyz(State(state().await)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ready);
        assert_eq!(body.database, "up");
    }

    #[tokio::test]
    async fn test_readyz_is_unavailable_when_database_is_closed() {
        let state = state().await;
        state.db.close().await;

        let (status, Json(body)) = readyz(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);
        assert_eq!(body.database, "down");
    }

    #[tokio::test]
    async fn test_healthz_reports_version() {
        let Json(body) = healthz().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
