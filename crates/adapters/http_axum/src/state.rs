//! Shared application state for axum handlers.

use std::sync::Arc;

use waveplus_app::failure::FailureHandler;
use waveplus_app::ports::MetricsSource;

/// Application state shared across all axum handlers.
///
/// Generic over the metrics source to avoid dynamic dispatch.
/// `Clone` is implemented manually so the source itself does not need to be
/// `Clone`; only the `Arc` wrapper is cloned.
pub struct AppState<S> {
    /// Collector invoked on every scrape.
    pub source: Arc<S>,
    /// Decides which collection failures end the process.
    pub failures: FailureHandler,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            failures: self.failures.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: MetricsSource + 'static,
{
    /// Create a new application state owning `source`.
    pub fn new(source: S, failures: FailureHandler) -> Self {
        Self::from_arc(Arc::new(source), failures)
    }

    /// Create a new application state from a pre-wrapped `Arc` source.
    ///
    /// Use this when the source is shared with background tasks (the poller)
    /// before constructing the HTTP state.
    pub fn from_arc(source: Arc<S>, failures: FailureHandler) -> Self {
        Self { source, failures }
    }
}
