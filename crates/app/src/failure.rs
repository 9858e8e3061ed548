//! Deciding which cycle failures end the process.
//!
//! The collector only returns typed errors. Callers (scrape handler, poller)
//! hand failures to a [`FailureHandler`], which logs them and forwards the
//! terminal ones to the composition root for shutdown.

use tokio::sync::mpsc;

use waveplus_domain::error::ExporterError;

/// Which errors are terminal for the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failed cycle stops the exporter.
    #[default]
    FailFast,
    /// Only fatal errors stop the exporter; transient ones fail one cycle.
    IsolateTransient,
}

impl FailurePolicy {
    /// Build the policy from the `fail_fast` configuration flag.
    #[must_use]
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::IsolateTransient
        }
    }

    /// Whether `err` must stop the process under this policy.
    #[must_use]
    pub fn is_terminal(self, err: &ExporterError) -> bool {
        match self {
            Self::FailFast => true,
            Self::IsolateTransient => err.is_fatal(),
        }
    }
}

/// Applies a [`FailurePolicy`] and reports terminal errors.
#[derive(Debug, Clone)]
pub struct FailureHandler {
    policy: FailurePolicy,
    terminal_tx: mpsc::Sender<ExporterError>,
}

impl FailureHandler {
    /// Create a handler and the receiver on which terminal errors arrive.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> (Self, mpsc::Receiver<ExporterError>) {
        let (terminal_tx, terminal_rx) = mpsc::channel(1);
        (
            Self {
                policy,
                terminal_tx,
            },
            terminal_rx,
        )
    }

    /// Active policy.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Log `err` and forward it when terminal. Returns whether it was terminal.
    pub fn report(&self, err: ExporterError) -> bool {
        if !self.policy.is_terminal(&err) {
            tracing::warn!(error = %err, "acquisition cycle failed");
            return false;
        }

        tracing::error!(error = %err, "acquisition cycle failed, shutting down");
        // A full channel means a terminal error is already pending.
        if let Err(mpsc::error::TrySendError::Closed(_)) = self.terminal_tx.try_send(err) {
            tracing::debug!("shutdown supervisor no longer listening");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn should_default_to_fail_fast() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::FailFast);
        assert_eq!(FailurePolicy::from_fail_fast(true), FailurePolicy::FailFast);
        assert_eq!(
            FailurePolicy::from_fail_fast(false),
            FailurePolicy::IsolateTransient
        );
    }

    #[test]
    fn should_treat_every_error_as_terminal_when_failing_fast() {
        let timeout = ExporterError::CycleTimeout(Duration::from_secs(1));
        assert!(FailurePolicy::FailFast.is_terminal(&timeout));
        assert!(FailurePolicy::FailFast.is_terminal(&ExporterError::NotConnected));
    }

    #[test]
    fn should_isolate_transient_errors() {
        let timeout = ExporterError::CycleTimeout(Duration::from_secs(1));
        assert!(!FailurePolicy::IsolateTransient.is_terminal(&timeout));
        assert!(FailurePolicy::IsolateTransient.is_terminal(&ExporterError::NotConnected));
    }

    #[tokio::test]
    async fn should_forward_terminal_errors() {
        let (handler, mut rx) = FailureHandler::new(FailurePolicy::FailFast);

        assert!(handler.report(ExporterError::UnsupportedSchemaVersion(4)));

        let forwarded = rx.recv().await.unwrap();
        assert!(matches!(forwarded, ExporterError::UnsupportedSchemaVersion(4)));
    }

    #[tokio::test]
    async fn should_not_forward_isolated_errors() {
        let (handler, mut rx) = FailureHandler::new(FailurePolicy::IsolateTransient);

        assert!(!handler.report(ExporterError::CycleTimeout(Duration::from_secs(1))));

        drop(handler);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn should_tolerate_closed_receiver() {
        let (handler, rx) = FailureHandler::new(FailurePolicy::FailFast);
        drop(rx);
        assert!(handler.report(ExporterError::NotConnected));
    }
}
