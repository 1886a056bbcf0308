//! Router assembly.

mod common;
mod users;

pub use common::{common_routes, common_routes_with_ready};
pub use users::user_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application router: common probes plus user routes, with body limit and request tracing.
pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(user_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
