//! BLE transport port: the only Bluetooth primitives the exporter needs.
//!
//! Any BLE stack able to scan for manufacturer data, connect by address,
//! resolve a characteristic by UUID and read it can back these traits.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use waveplus_domain::error::ExporterError;

/// One device seen during a scan window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement<A> {
    /// Transport address used to connect to the device.
    pub address: A,
    /// Raw manufacturer-data fields, each starting with the little-endian
    /// company identifier.
    pub manufacturer_data: Vec<Vec<u8>>,
}

/// Scanning and connection side of a BLE stack.
pub trait BleTransport: Send + Sync {
    /// Address the stack uses to reach a peripheral.
    type Address: Clone + fmt::Debug + Send + Sync;
    /// An established GATT connection.
    type Link: GattLink;

    /// Scan for advertisements during one window of `window`.
    fn scan(
        &self,
        window: Duration,
    ) -> impl Future<Output = Result<Vec<Advertisement<Self::Address>>, ExporterError>> + Send;

    /// Open a GATT connection to `address`.
    fn connect(
        &self,
        address: &Self::Address,
    ) -> impl Future<Output = Result<Self::Link, ExporterError>> + Send;
}

/// An open GATT connection.
pub trait GattLink: Send + Sync {
    /// Handle of a resolved characteristic.
    type Characteristic: Send + Sync;

    /// Resolve the characteristic identified by `uuid`.
    fn characteristic(
        &self,
        uuid: uuid::Uuid,
    ) -> impl Future<Output = Result<Self::Characteristic, ExporterError>> + Send;

    /// Read the current value of `characteristic`.
    fn read(
        &self,
        characteristic: &Self::Characteristic,
    ) -> impl Future<Output = Result<Vec<u8>, ExporterError>> + Send;

    /// Close the connection.
    fn disconnect(&self) -> impl Future<Output = Result<(), ExporterError>> + Send;
}
