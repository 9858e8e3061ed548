//! # waveplus-adapter-ble
//!
//! BLE adapter: implements the `BleTransport` and `GattLink` ports on top
//! of [btleplug](https://docs.rs/btleplug).
//!
//! ## How it works
//!
//! Discovery runs short scan windows and reports every peripheral carrying
//! manufacturer data; the application layer picks the one whose Airthings
//! record (company `0x0334`) holds the configured serial number. Reads open a
//! GATT connection by peripheral id, then discover services, resolve the
//! current-values characteristic and read its 20-byte record.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `waveplus-app` and `waveplus-domain`.

mod config;
mod error;
mod gatt;
mod scanner;

pub use config::BleConfig;
pub use error::BleError;

use std::time::Duration;

use btleplug::api::{Central, Manager as _};
use btleplug::platform::{Adapter, Manager, PeripheralId};

use waveplus_app::ports::{Advertisement, BleTransport};
use waveplus_domain::error::ExporterError;

use crate::gatt::BtleplugLink;

/// btleplug-backed BLE transport bound to one host adapter.
pub struct BtleplugTransport {
    central: Adapter,
}

impl BtleplugTransport {
    /// Open the host adapter selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BleError::NotAvailable`] when the host has no adapter,
    /// [`BleError::AdapterNotFound`] when the configured one is missing, or
    /// [`BleError::Scan`] when the OS Bluetooth stack cannot be queried.
    pub async fn new(config: &BleConfig) -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        if adapters.is_empty() {
            return Err(BleError::NotAvailable);
        }

        for central in adapters {
            let info = central.adapter_info().await?;
            if config.matches_adapter(&info) {
                tracing::info!(adapter = %info, "using BLE adapter");
                return Ok(Self { central });
            }
        }

        Err(BleError::AdapterNotFound {
            name: config.adapter.clone().unwrap_or_default(),
        })
    }
}

impl BleTransport for BtleplugTransport {
    type Address = PeripheralId;
    type Link = BtleplugLink;

    async fn scan(
        &self,
        window: Duration,
    ) -> Result<Vec<Advertisement<PeripheralId>>, ExporterError> {
        Ok(scanner::scan_window(&self.central, window).await?)
    }

    async fn connect(&self, address: &PeripheralId) -> Result<BtleplugLink, ExporterError> {
        Ok(gatt::open(&self.central, address).await?)
    }
}
