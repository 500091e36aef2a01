//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, Backend};

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api/v1` next to an unauthenticated
/// `/health` probe. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
