//! Metrics collector: one full acquisition cycle per call.

use std::time::Duration;

use tokio::sync::Mutex;

use waveplus_domain::error::ExporterError;
use waveplus_domain::metrics::MetricFamily;
use waveplus_domain::reading::{RadonLevel, SensorReading};

use crate::ports::{BleTransport, MetricsSource};
use crate::session::DeviceSession;

/// Name of the exported metric family.
pub const FAMILY_NAME: &str = "waveplus";

/// Help text of the exported metric family.
pub const FAMILY_HELP: &str = "airthings waveplus sensor values";

/// Serializes acquisition cycles against a single [`DeviceSession`].
///
/// The session lock is held for the whole connect → read → convert →
/// disconnect sequence, so overlapping scrapes never interleave BLE
/// transactions. The guard is dropped on every exit path.
pub struct MetricsCollector<T: BleTransport> {
    session: Mutex<DeviceSession<T>>,
    cycle_timeout: Option<Duration>,
}

impl<T: BleTransport> MetricsCollector<T> {
    /// Create a collector owning `session`.
    ///
    /// With `cycle_timeout` set, connect and read must finish within that
    /// deadline or the cycle fails with [`ExporterError::CycleTimeout`].
    pub fn new(session: DeviceSession<T>, cycle_timeout: Option<Duration>) -> Self {
        Self {
            session: Mutex::new(session),
            cycle_timeout,
        }
    }

    /// Close any open link. Used on process shutdown.
    pub async fn shutdown(&self) {
        self.session.lock().await.disconnect().await;
    }

    async fn run_cycle(&self) -> Result<MetricFamily, ExporterError> {
        let mut session = self.session.lock().await;

        let result = match self.cycle_timeout {
            Some(deadline) => tokio::time::timeout(deadline, acquire(&mut session))
                .await
                .unwrap_or_else(|_elapsed| Err(ExporterError::CycleTimeout(deadline))),
            None => acquire(&mut session).await,
        };

        session.disconnect().await;
        result
    }
}

async fn acquire<T: BleTransport>(
    session: &mut DeviceSession<T>,
) -> Result<MetricFamily, ExporterError> {
    session.connect().await?;
    let reading = session.read_current_values().await?;
    Ok(family_from_reading(&reading))
}

impl<T: BleTransport> MetricsSource for MetricsCollector<T> {
    #[tracing::instrument(skip(self))]
    async fn collect(&self) -> Result<MetricFamily, ExporterError> {
        let family = self.run_cycle().await?;
        tracing::debug!(samples = family.samples.len(), "acquisition cycle complete");
        Ok(family)
    }
}

/// Convert a reading into the `waveplus` gauge family.
///
/// Unavailable radon averages become `NaN`.
#[must_use]
pub fn family_from_reading(reading: &SensorReading) -> MetricFamily {
    MetricFamily::gauge(FAMILY_NAME, FAMILY_HELP)
        .with_sample("humidity_percent", reading.humidity_percent)
        .with_sample(
            "radon_short_term_avg_becquerels",
            radon_value(reading.radon_short_term_avg),
        )
        .with_sample(
            "radon_long_term_avg_becquerels",
            radon_value(reading.radon_long_term_avg),
        )
        .with_sample("temperature_celsius", reading.temperature_celsius)
        .with_sample("pressure_pascal", reading.pressure_hecto_pascal)
        .with_sample("carbondioxide_ppm", reading.co2_ppm)
        .with_sample("voc_ppb", reading.voc_ppb)
}

fn radon_value(level: RadonLevel) -> f64 {
    level.value().map_or(f64::NAN, f64::from)
}
