//! Wave Plus "current values" payload decoder.
//!
//! Pure functions operating on raw `&[u8]` slices; no BLE dependency needed.
//! The characteristic value is a fixed 20-byte record of four `u8` fields
//! followed by eight little-endian `u16` fields.

use crate::error::ExporterError;

/// Width of the current-values record in bytes.
pub const PAYLOAD_LEN: usize = 20;

/// The only record layout this decoder understands.
pub const SUPPORTED_SCHEMA_VERSION: u8 = 1;

/// Largest raw radon value that still denotes a measurement.
pub const RADON_MAX: u16 = 16383;

const BYTE_FIELDS: usize = 4;
const WORD_FIELDS: usize = 8;

/// A radon average, either measured or flagged as unavailable by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadonLevel {
    /// Measured value in Bq/m³.
    Valid(u16),
    /// Invalid measurement, or not available yet.
    Unavailable,
}

impl RadonLevel {
    /// Apply the validity filter to a raw radon field.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        if raw <= RADON_MAX {
            Self::Valid(raw)
        } else {
            Self::Unavailable
        }
    }

    /// Numeric value, or `None` when unavailable.
    #[must_use]
    pub fn value(self) -> Option<u16> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// One decoded set of Wave Plus sensor values.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Layout version reported by the device.
    pub schema_version: u8,
    /// Relative humidity in percent.
    pub humidity_percent: f64,
    /// Short-term radon average.
    pub radon_short_term_avg: RadonLevel,
    /// Long-term radon average.
    pub radon_long_term_avg: RadonLevel,
    /// Temperature in degrees Celsius.
    pub temperature_celsius: f64,
    /// Relative atmospheric pressure in hPa.
    pub pressure_hecto_pascal: f64,
    /// CO₂ level in ppm.
    pub co2_ppm: f64,
    /// VOC level in ppb.
    pub voc_ppb: f64,
}

/// Unpacked 12-field record, before any interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawRecord {
    bytes: [u8; BYTE_FIELDS],
    words: [u16; WORD_FIELDS],
}

impl RawRecord {
    fn unpack(data: &[u8]) -> Result<Self, ExporterError> {
        if data.len() != PAYLOAD_LEN {
            return Err(ExporterError::PayloadLength {
                expected: PAYLOAD_LEN,
                actual: data.len(),
            });
        }

        let mut bytes = [0u8; BYTE_FIELDS];
        bytes.copy_from_slice(&data[..BYTE_FIELDS]);

        let mut words = [0u16; WORD_FIELDS];
        for (word, chunk) in words
            .iter_mut()
            .zip(data[BYTE_FIELDS..].chunks_exact(2))
        {
            *word = u16::from_le_bytes([chunk[0], chunk[1]]);
        }

        Ok(Self { bytes, words })
    }

    /// Field by its index in the 12-field record.
    fn word(&self, field: usize) -> u16 {
        self.words[field - BYTE_FIELDS]
    }
}

/// Decode the current-values characteristic.
///
/// | Field | Offset | Type | Value |
/// |-------|--------|------|-------|
/// | 0 | 0 | u8 | Schema version |
/// | 1 | 1 | u8 | Humidity, ×0.5 % |
/// | 2–3 | 2–3 | u8 | Reserved |
/// | 4 | 4–5 | u16 LE | Radon short-term average, Bq/m³ |
/// | 5 | 6–7 | u16 LE | Radon long-term average, Bq/m³ |
/// | 6 | 8–9 | u16 LE | Temperature, ×0.01 °C |
/// | 7 | 10–11 | u16 LE | Pressure, ×0.02 hPa |
/// | 8 | 12–13 | u16 LE | CO₂, ppm |
/// | 9 | 14–15 | u16 LE | VOC, ppb |
/// | 10–11 | 16–19 | u16 LE | Reserved |
///
/// # Errors
///
/// Returns [`ExporterError::PayloadLength`] when the slice is not 20 bytes and
/// [`ExporterError::UnsupportedSchemaVersion`] for any version other than 1.
pub fn decode(data: &[u8]) -> Result<SensorReading, ExporterError> {
    let raw = RawRecord::unpack(data)?;

    let schema_version = raw.bytes[0];
    if schema_version != SUPPORTED_SCHEMA_VERSION {
        return Err(ExporterError::UnsupportedSchemaVersion(schema_version));
    }

    Ok(SensorReading {
        schema_version,
        humidity_percent: f64::from(raw.bytes[1]) / 2.0,
        radon_short_term_avg: RadonLevel::from_raw(raw.word(4)),
        radon_long_term_avg: RadonLevel::from_raw(raw.word(5)),
        temperature_celsius: f64::from(raw.word(6)) / 100.0,
        pressure_hecto_pascal: f64::from(raw.word(7)) / 50.0,
        co2_ppm: f64::from(raw.word(8)),
        voc_ppb: f64::from(raw.word(9)),
    })
}
