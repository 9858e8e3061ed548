//! Background poll loop: runs an acquisition cycle every period.
//!
//! Scrapes and polls funnel through the same [`MetricsSource`], so they share
//! the collector lock and never overlap on the radio.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::failure::FailureHandler;
use crate::ports::MetricsSource;

/// Periodically collects from a [`MetricsSource`] and logs the values.
pub struct Poller<S> {
    source: Arc<S>,
    period: Duration,
    failures: FailureHandler,
}

impl<S: MetricsSource + 'static> Poller<S> {
    /// Spawn the poll loop. The first cycle runs immediately.
    ///
    /// The loop ends after the first terminal failure.
    pub fn start(source: Arc<S>, period: Duration, failures: FailureHandler) -> JoinHandle<()> {
        let poller = Self {
            source,
            period,
            failures,
        };

        tokio::spawn(poller.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.iterate().await {
                tracing::info!("poll loop stopped");
                return;
            }
        }
    }

    /// Run one cycle. Returns `false` when polling must stop.
    async fn iterate(&self) -> bool {
        match self.source.collect().await {
            Ok(family) => {
                for sample in &family.samples {
                    tracing::info!(metric = sample.name, value = sample.value, "sensor value");
                }
                true
            }
            Err(err) => !self.failures.report(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use waveplus_domain::error::ExporterError;
    use waveplus_domain::metrics::MetricFamily;

    use crate::failure::FailurePolicy;

    struct CountingSource {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl CountingSource {
        fn new(fail_on: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MetricsSource for CountingSource {
        async fn collect(&self) -> Result<MetricFamily, ExporterError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                return Err(ExporterError::CycleTimeout(Duration::from_secs(1)));
            }
            Ok(MetricFamily::gauge("waveplus", "test").with_sample("voc_ppb", 1.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_every_period() {
        let source = CountingSource::new(None);
        let (failures, _rx) = FailureHandler::new(FailurePolicy::FailFast);

        let handle = Poller::start(Arc::clone(&source), Duration::from_secs(60), failures);

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(source.calls(), 3);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_after_terminal_failure() {
        let source = CountingSource::new(Some(2));
        let (failures, mut rx) = FailureHandler::new(FailurePolicy::FailFast);

        let handle = Poller::start(Arc::clone(&source), Duration::from_secs(60), failures);

        let err = rx.recv().await.unwrap();
        assert!(matches!(err, ExporterError::CycleTimeout(_)));
        handle.await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_after_isolated_failure() {
        let source = CountingSource::new(Some(1));
        let (failures, _rx) = FailureHandler::new(FailurePolicy::IsolateTransient);

        let handle = Poller::start(Arc::clone(&source), Duration::from_secs(60), failures);

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(source.calls(), 2);
        assert!(!handle.is_finished());
        handle.abort();
    }
}
