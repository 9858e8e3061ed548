//! Scrape handler.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use waveplus_app::ports::MetricsSource;

use crate::error::ScrapeError;
use crate::exposition;
use crate::state::AppState;

/// `GET /metrics`: run one acquisition cycle and render it.
///
/// Failed cycles go through the failure handler, which decides whether the
/// process shuts down; the response is `500` when it does and `503`
/// otherwise.
///
/// # Errors
///
/// Returns [`ScrapeError`] when the acquisition cycle fails.
pub async fn scrape<S>(State(state): State<AppState<S>>) -> Result<Response, ScrapeError>
where
    S: MetricsSource + 'static,
{
    match state.source.collect().await {
        Ok(family) => Ok((
            [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
            exposition::render(&family),
        )
            .into_response()),
        Err(err) => {
            let message = err.to_string();
            let terminal = state.failures.report(err);
            Err(ScrapeError::new(message, terminal))
        }
    }
}
