//! Device session: the BLE connection state machine for one Wave Plus.
//!
//! The device is found by its advertised serial number once; the resulting
//! address is cached for the lifetime of the session. Every acquisition
//! cycle opens a fresh GATT link, reads the current-values characteristic
//! and closes the link again.

use std::time::Duration;

use waveplus_domain::error::ExporterError;
use waveplus_domain::identity::DeviceIdentity;
use waveplus_domain::reading::{self, SensorReading};
use waveplus_domain::serial::parse_serial_number;

use crate::ports::{BleTransport, GattLink};

/// GATT characteristic holding the 20-byte current-values record.
pub const CURRENT_VALUES_CHARACTERISTIC: uuid::Uuid =
    uuid::Uuid::from_u128(0xb42e_2a68_ade7_11e4_89d3_123b_93f7_5cba);

/// Where the session is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No address known.
    Idle,
    /// Scanning for the advertised serial number.
    Discovering,
    /// Address known, no link open.
    Discovered,
    /// Link open and characteristic resolved.
    Connected,
    /// Characteristic read in progress.
    Reading,
}

/// Bounds of the discovery scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Number of scan windows before giving up.
    pub max_attempts: u32,
    /// Length of one scan window.
    pub scan_window: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            scan_window: Duration::from_millis(100),
        }
    }
}

/// Connection state machine for a single sensor.
pub struct DeviceSession<T: BleTransport> {
    transport: T,
    identity: DeviceIdentity<T::Address>,
    discovery: DiscoveryConfig,
    link: Option<T::Link>,
    characteristic: Option<<T::Link as GattLink>::Characteristic>,
    state: SessionState,
}

impl<T: BleTransport> DeviceSession<T> {
    /// Create a session targeting the device with `serial_number`.
    pub fn new(transport: T, serial_number: u32, discovery: DiscoveryConfig) -> Self {
        Self {
            transport,
            identity: DeviceIdentity::new(serial_number),
            discovery,
            link: None,
            characteristic: None,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Target identity, including the cached address once discovered.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity<T::Address> {
        &self.identity
    }

    /// Resolve the device address, scanning only if none is cached yet.
    ///
    /// Scans at most `max_attempts` windows and stops at the first
    /// advertisement whose manufacturer data carries the target serial number.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::DeviceNotFound`] when every window elapsed
    /// without a match, or a transport error if scanning fails.
    #[tracing::instrument(skip(self), fields(serial_number = self.identity.serial_number()))]
    pub async fn discover(&mut self) -> Result<T::Address, ExporterError> {
        if let Some(address) = self.identity.address() {
            return Ok(address.clone());
        }

        self.state = SessionState::Discovering;
        let result = self.scan_for_device().await;
        self.state = if result.is_ok() {
            SessionState::Discovered
        } else {
            SessionState::Idle
        };
        result
    }

    async fn scan_for_device(&mut self) -> Result<T::Address, ExporterError> {
        let serial_number = self.identity.serial_number();

        for attempt in 1..=self.discovery.max_attempts {
            let advertisements = self.transport.scan(self.discovery.scan_window).await?;

            let found = advertisements.into_iter().find(|adv| {
                adv.manufacturer_data
                    .iter()
                    .any(|data| parse_serial_number(data) == Some(serial_number))
            });

            if let Some(adv) = found {
                tracing::info!(attempt, address = ?adv.address, "Wave Plus discovered");
                return Ok(self.identity.resolve(adv.address).clone());
            }

            tracing::trace!(attempt, "no matching advertisement in scan window");
        }

        Err(ExporterError::DeviceNotFound {
            serial_number,
            attempts: self.discovery.max_attempts,
        })
    }

    /// Open the GATT link and resolve the current-values characteristic.
    ///
    /// Discovers the device first when no address is cached. Does nothing
    /// when already connected. The link is owned by the session as soon as
    /// the transport returns it, so [`disconnect`](Self::disconnect) closes it
    /// even when this future is dropped while the characteristic is being
    /// resolved.
    ///
    /// # Errors
    ///
    /// Propagates discovery errors and transport errors from the link setup.
    #[tracing::instrument(skip(self), fields(serial_number = self.identity.serial_number()))]
    pub async fn connect(&mut self) -> Result<(), ExporterError> {
        if self.characteristic.is_some() {
            return Ok(());
        }

        let address = self.discover().await?;
        if self.link.is_none() {
            let link = self.transport.connect(&address).await?;
            self.link = Some(link);
        }
        let Some(link) = &self.link else {
            return Err(ExporterError::NotConnected);
        };

        match link.characteristic(CURRENT_VALUES_CHARACTERISTIC).await {
            Ok(characteristic) => {
                tracing::debug!(address = ?address, "connected");
                self.characteristic = Some(characteristic);
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.disconnect().await;
                Err(err)
            }
        }
    }

    /// Read and decode the current sensor values.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::NotConnected`] outside the `Connected` state,
    /// a transport error if the read fails, or a decoder error.
    pub async fn read_current_values(&mut self) -> Result<SensorReading, ExporterError> {
        let (Some(link), Some(characteristic)) = (&self.link, &self.characteristic) else {
            return Err(ExporterError::NotConnected);
        };

        self.state = SessionState::Reading;
        let result = link.read(characteristic).await;
        self.state = SessionState::Connected;

        reading::decode(&result?)
    }

    /// Close the link, keeping the discovered address.
    ///
    /// Safe to call in any state and any number of times.
    pub async fn disconnect(&mut self) {
        self.characteristic = None;
        if let Some(link) = self.link.take()
            && let Err(err) = link.disconnect().await
        {
            tracing::warn!(%err, "failed to disconnect Wave Plus peripheral");
        }

        self.state = if self.identity.address().is_some() {
            SessionState::Discovered
        } else {
            SessionState::Idle
        };
    }
}
