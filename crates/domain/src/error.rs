//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ExporterError`] at the port boundary (see `BleError::into_domain`).

use std::time::Duration;

/// Boxed source error coming from an adapter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by an acquisition cycle.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Discovery exhausted every scan window without a matching advertisement.
    #[error("could not find device with serial number {serial_number} after {attempts} scan windows")]
    DeviceNotFound {
        /// Serial number the scan was looking for.
        serial_number: u32,
        /// Number of scan windows that elapsed.
        attempts: u32,
    },

    /// The payload declares a layout this exporter cannot interpret.
    #[error("unsupported sensor schema version {0}")]
    UnsupportedSchemaVersion(u8),

    /// The characteristic value does not have the fixed record width.
    #[error("sensor payload must be {expected} bytes, got {actual}")]
    PayloadLength {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// A read was attempted without an active connection.
    #[error("device is not connected")]
    NotConnected,

    /// The cycle did not complete before its deadline.
    #[error("acquisition cycle timed out after {0:?}")]
    CycleTimeout(Duration),

    /// The BLE transport failed (link drop, read failure, adapter error, …).
    #[error("BLE transport error: {0}")]
    Transport(#[source] BoxError),
}

impl ExporterError {
    /// Whether the error means the exporter cannot continue safely.
    ///
    /// Fatal errors point at a misconfiguration, a protocol mismatch or an
    /// orchestration bug. Transport failures and timeouts are transient.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DeviceNotFound { .. }
            | Self::UnsupportedSchemaVersion(_)
            | Self::PayloadLength { .. }
            | Self::NotConnected => true,
            Self::CycleTimeout(_) | Self::Transport(_) => false,
        }
    }

    /// Operator-facing hints logged before the process exits.
    #[must_use]
    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            Self::DeviceNotFound { .. } => &[
                "(1) Please verify the serial number.",
                "(2) Ensure that the device is advertising.",
                "(3) Retry connection.",
            ],
            Self::UnsupportedSchemaVersion(_) | Self::PayloadLength { .. } => {
                &["Contact Airthings for support."]
            }
            Self::NotConnected | Self::CycleTimeout(_) | Self::Transport(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("link lost")]
    struct LinkLost;

    #[test]
    fn should_display_device_not_found() {
        let err = ExporterError::DeviceNotFound {
            serial_number: 123_456_789,
            attempts: 50,
        };
        assert_eq!(
            err.to_string(),
            "could not find device with serial number 123456789 after 50 scan windows"
        );
    }

    #[test]
    fn should_display_unsupported_schema_version() {
        let err = ExporterError::UnsupportedSchemaVersion(2);
        assert_eq!(err.to_string(), "unsupported sensor schema version 2");
    }

    #[test]
    fn should_classify_protocol_errors_as_fatal() {
        assert!(ExporterError::UnsupportedSchemaVersion(3).is_fatal());
        assert!(ExporterError::NotConnected.is_fatal());
        assert!(
            ExporterError::PayloadLength {
                expected: 20,
                actual: 4
            }
            .is_fatal()
        );
    }

    #[test]
    fn should_classify_transport_errors_as_transient() {
        assert!(!ExporterError::Transport(Box::new(LinkLost)).is_fatal());
        assert!(!ExporterError::CycleTimeout(Duration::from_secs(30)).is_fatal());
    }

    #[test]
    fn should_expose_transport_source() {
        let err = ExporterError::Transport(Box::new(LinkLost));
        assert_eq!(err.to_string(), "BLE transport error: link lost");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "link lost");
    }

    #[test]
    fn should_give_operator_guidance_for_missing_device() {
        let err = ExporterError::DeviceNotFound {
            serial_number: 1,
            attempts: 50,
        };
        assert_eq!(err.guidance().len(), 3);
        assert!(ExporterError::NotConnected.guidance().is_empty());
    }
}
