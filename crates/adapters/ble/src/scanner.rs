//! BLE scanner: one bounded scan window per call.
//!
//! Manufacturer data is collected from advertisement events received during
//! the window, then from the properties cached by the OS for peripherals that
//! did not re-announce their data.

use std::collections::HashMap;
use std::time::Duration;

use btleplug::api::{Central, CentralEvent, Peripheral as _, PeripheralProperties, ScanFilter};
use btleplug::platform::{Adapter, PeripheralId};
use tokio_stream::StreamExt as _;

use waveplus_app::ports::Advertisement;

use crate::error::BleError;

/// Rebuild raw manufacturer-data fields from btleplug's map.
///
/// btleplug splits the little-endian company identifier off into the map
/// key; the domain decoder expects it back in front of the payload.
#[must_use]
pub(crate) fn manufacturer_fields(data: &HashMap<u16, Vec<u8>>) -> Vec<Vec<u8>> {
    data.iter()
        .map(|(company, payload)| {
            let mut field = Vec::with_capacity(payload.len() + 2);
            field.extend_from_slice(&company.to_le_bytes());
            field.extend_from_slice(payload);
            field
        })
        .collect()
}

fn from_properties(
    id: PeripheralId,
    props: &PeripheralProperties,
) -> Option<Advertisement<PeripheralId>> {
    if props.manufacturer_data.is_empty() {
        return None;
    }

    Some(Advertisement {
        address: id,
        manufacturer_data: manufacturer_fields(&props.manufacturer_data),
    })
}

/// Scan for `window` and return every advertisement carrying manufacturer data.
///
/// # Errors
///
/// Returns [`BleError::Scan`] when the scan cannot be started or stopped, or
/// the peripheral list cannot be read.
pub(crate) async fn scan_window(
    central: &Adapter,
    window: Duration,
) -> Result<Vec<Advertisement<PeripheralId>>, BleError> {
    let mut events = central.events().await?;
    central.start_scan(ScanFilter::default()).await?;

    let mut advertisements = Vec::new();
    let deadline = tokio::time::Instant::now() + window;

    while tokio::time::Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, events.next()).await {
            Ok(Some(CentralEvent::ManufacturerDataAdvertisement {
                id,
                manufacturer_data,
            })) => {
                tracing::trace!(?id, "manufacturer data advertisement");
                advertisements.push(Advertisement {
                    address: id,
                    manufacturer_data: manufacturer_fields(&manufacturer_data),
                });
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    central.stop_scan().await?;

    // Some stacks only emit an event when the data changes.
    for peripheral in central.peripherals().await? {
        let Ok(Some(props)) = peripheral.properties().await else {
            continue;
        };
        if let Some(adv) = from_properties(peripheral.id(), &props) {
            advertisements.push(adv);
        }
    }

    tracing::trace!(count = advertisements.len(), "scan window complete");
    Ok(advertisements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveplus_domain::serial::parse_serial_number;

    #[test]
    fn should_prepend_company_id_little_endian() {
        let data = HashMap::from([(0x0334, vec![0x15, 0xCD, 0x5B, 0x07, 0x09, 0x00])]);

        let fields = manufacturer_fields(&data);

        assert_eq!(
            fields,
            [vec![0x34, 0x03, 0x15, 0xCD, 0x5B, 0x07, 0x09, 0x00]]
        );
        assert_eq!(parse_serial_number(&fields[0]), Some(123_456_789));
    }

    #[test]
    fn should_keep_one_field_per_company() {
        let data = HashMap::from([(0x0334, vec![0x01, 0x00, 0x00, 0x00]), (0x0499, vec![0x05])]);

        let mut fields = manufacturer_fields(&data);
        fields.sort();

        assert_eq!(fields, [vec![0x34, 0x03, 0x01, 0x00, 0x00, 0x00], vec![0x99, 0x04, 0x05]]);
    }

    #[test]
    fn should_handle_empty_payload() {
        let data = HashMap::from([(0x0334, Vec::new())]);
        let fields = manufacturer_fields(&data);
        assert_eq!(fields, [vec![0x34, 0x03]]);
        assert_eq!(parse_serial_number(&fields[0]), None);
    }
}
