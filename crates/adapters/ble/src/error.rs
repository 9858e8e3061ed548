//! BLE adapter error types.

use waveplus_domain::error::ExporterError;

/// Errors specific to the BLE adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// The configured adapter is not present on the host.
    #[error("BLE adapter {name:?} not found")]
    AdapterNotFound {
        /// Name fragment the configuration asked for.
        name: String,
    },

    /// BLE scan or adapter operation failed.
    #[error("BLE scan error")]
    Scan(#[from] btleplug::Error),

    /// Connecting to the peripheral failed.
    #[error("failed to connect to BLE peripheral")]
    GattConnect(#[source] btleplug::Error),

    /// Reading a characteristic failed.
    #[error("failed to read GATT characteristic")]
    Read(#[source] btleplug::Error),

    /// Closing the connection failed.
    #[error("failed to disconnect from BLE peripheral")]
    Disconnect(#[source] btleplug::Error),

    /// The peripheral does not expose the requested characteristic.
    #[error("GATT characteristic {uuid} not found")]
    CharacteristicNotFound {
        /// UUID that was looked up.
        uuid: uuid::Uuid,
    },
}

impl BleError {
    /// Convert into an [`ExporterError::Transport`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> ExporterError {
        ExporterError::Transport(Box::new(self))
    }
}

impl From<BleError> for ExporterError {
    fn from(err: BleError) -> Self {
        err.into_domain()
    }
}
