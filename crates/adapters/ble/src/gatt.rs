//! GATT connection to a Wave Plus peripheral.
//!
//! [`open`] only establishes the connection and hands the link back, so the
//! caller owns it before anything else can stall. [`BtleplugLink`] then
//! discovers services, resolves and reads characteristics until it is
//! disconnected.

use btleplug::api::{Central, Characteristic, Peripheral as _};
use btleplug::platform::{Adapter, Peripheral, PeripheralId};

use waveplus_app::ports::GattLink;
use waveplus_domain::error::ExporterError;

use crate::error::BleError;

/// An open btleplug connection.
pub struct BtleplugLink {
    peripheral: Peripheral,
}

/// Connect to the peripheral with `id`.
///
/// # Errors
///
/// Returns [`BleError::GattConnect`] if the connection fails, or
/// [`BleError::Scan`] if the peripheral is unknown to the adapter.
pub(crate) async fn open(central: &Adapter, id: &PeripheralId) -> Result<BtleplugLink, BleError> {
    let peripheral = central.peripheral(id).await?;
    peripheral.connect().await.map_err(BleError::GattConnect)?;
    Ok(BtleplugLink { peripheral })
}

/// Find a GATT characteristic by UUID on a peripheral that has already
/// discovered its services.
///
/// # Errors
///
/// Returns [`BleError::CharacteristicNotFound`] if no characteristic with
/// the given UUID is present.
fn find_characteristic(
    peripheral: &Peripheral,
    uuid: uuid::Uuid,
) -> Result<Characteristic, BleError> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or(BleError::CharacteristicNotFound { uuid })
}

impl GattLink for BtleplugLink {
    type Characteristic = Characteristic;

    async fn characteristic(&self, uuid: uuid::Uuid) -> Result<Characteristic, ExporterError> {
        self.peripheral
            .discover_services()
            .await
            .map_err(BleError::GattConnect)?;
        Ok(find_characteristic(&self.peripheral, uuid)?)
    }

    async fn read(&self, characteristic: &Characteristic) -> Result<Vec<u8>, ExporterError> {
        let value = self
            .peripheral
            .read(characteristic)
            .await
            .map_err(BleError::Read)?;
        tracing::trace!(len = value.len(), "characteristic read");
        Ok(value)
    }

    async fn disconnect(&self) -> Result<(), ExporterError> {
        self.peripheral
            .disconnect()
            .await
            .map_err(BleError::Disconnect)?;
        Ok(())
    }
}
