//! Router assembly: common routes at the root, entity routes under `/api/v1`.

mod common;
mod entity;

pub use common::{common_routes, common_routes_with_ready};
pub use entity::entity_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Full application router with a request body cap of `body_limit` bytes.
pub fn app_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", entity_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
}
