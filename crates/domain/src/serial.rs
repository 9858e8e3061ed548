//! Serial-number decoding from Airthings manufacturer-data advertisements.

/// Company identifier Airthings puts in front of its manufacturer data.
pub const AIRTHINGS_COMPANY_ID: u16 = 0x0334;

const MIN_LEN: usize = 6;

/// Decode the serial number carried in a raw manufacturer-data field.
///
/// `data` is the complete field: the little-endian company identifier
/// (bytes 0–1) followed by the little-endian serial number (bytes 2–5).
/// Returns `None` for any other company identifier or a truncated field.
#[must_use]
pub fn parse_serial_number(data: &[u8]) -> Option<u32> {
    if data.len() < MIN_LEN {
        return None;
    }

    if u16::from_le_bytes([data[0], data[1]]) != AIRTHINGS_COMPANY_ID {
        return None;
    }

    Some(u32::from_le_bytes([data[2], data[3], data[4], data[5]]))
}
