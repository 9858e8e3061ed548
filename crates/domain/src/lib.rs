//! # waveplus-domain
//!
//! Pure domain model for the Airthings Wave Plus exporter.
//!
//! ## Responsibilities
//! - Decode the 20-byte "current values" characteristic into a [`reading::SensorReading`]
//! - Decode the serial number carried in Airthings manufacturer-data advertisements
//! - Track the sticky identity of the target device ([`identity::DeviceIdentity`])
//! - Model the metric family handed to the exposition layer ([`metrics::MetricFamily`])
//! - Define the error taxonomy shared by every layer ([`error::ExporterError`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod identity;
pub mod metrics;
pub mod reading;
pub mod serial;
