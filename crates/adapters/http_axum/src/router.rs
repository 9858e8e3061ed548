//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use waveplus_app::ports::MetricsSource;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the scrape endpoint at `/metrics` and a liveness check at
/// `/health`. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<S>(state: AppState<S>) -> Router
where
    S: MetricsSource + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::metrics::scrape::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
