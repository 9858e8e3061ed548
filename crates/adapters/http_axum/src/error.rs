//! HTTP error response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// A scrape whose acquisition cycle failed.
///
/// No partial samples are ever returned: the body only carries the error.
pub struct ScrapeError {
    message: String,
    terminal: bool,
}

impl ScrapeError {
    /// Wrap an error message; `terminal` tells whether the process is
    /// shutting down because of it.
    #[must_use]
    pub fn new(message: String, terminal: bool) -> Self {
        Self { message, terminal }
    }

    fn status(&self) -> StatusCode {
        if self.terminal {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        (self.status(), format!("collection failed: {}\n", self.message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_terminal_error_to_internal_server_error() {
        let err = ScrapeError::new("not connected".to_owned(), true);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn should_map_isolated_error_to_service_unavailable() {
        let err = ScrapeError::new("cycle timed out".to_owned(), false);
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
