//! Identity of the target device.

/// The device the exporter reads from.
///
/// The serial number comes from configuration. The transport address is
/// learned by the first successful discovery and kept for the lifetime of
/// the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity<A> {
    serial_number: u32,
    address: Option<A>,
}

impl<A> DeviceIdentity<A> {
    /// Identity with no known address yet.
    #[must_use]
    pub fn new(serial_number: u32) -> Self {
        Self {
            serial_number,
            address: None,
        }
    }

    /// Configured serial number.
    #[must_use]
    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }

    /// Cached address, if discovery already succeeded.
    #[must_use]
    pub fn address(&self) -> Option<&A> {
        self.address.as_ref()
    }

    /// Record the discovered address.
    ///
    /// Write-once: an address that is already cached is kept and the new one
    /// is ignored. Returns the cached address.
    pub fn resolve(&mut self, address: A) -> &A {
        self.address.get_or_insert(address)
    }
}
