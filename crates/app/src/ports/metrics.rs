//! Metrics source port: what the exposition endpoint calls on every scrape.

use std::future::Future;

use waveplus_domain::error::ExporterError;
use waveplus_domain::metrics::MetricFamily;

/// Produces a fresh metric family on demand.
///
/// Implemented by [`MetricsCollector`](crate::collector::MetricsCollector);
/// the HTTP adapter holds an explicit reference to an implementation instead
/// of registering it in a global registry.
pub trait MetricsSource: Send + Sync {
    /// Run one acquisition cycle and return its samples.
    fn collect(&self) -> impl Future<Output = Result<MetricFamily, ExporterError>> + Send;
}
