//! Liveness, readiness and build info.

use crate::state::AppState;
use axum::http::StatusCode;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
    entities: usize,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// 503 while the relational backend is unreachable. Fixture reads keep working meanwhile.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let entities = state.registry.entities.len();
    match state.sql.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyBody {
                status: "ok",
                database: "ok",
                entities,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    database: "unavailable",
                    entities,
                }),
            )
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Stateless subset: GET /health and GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}

/// Adds GET /ready, which pings the SQL executor.
pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
