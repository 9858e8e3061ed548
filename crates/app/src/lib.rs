//! # waveplus-app
//!
//! Application layer: the acquisition cycle and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `BleTransport`: scan for advertisements, connect by address
//!   - `GattLink`: resolve and read a characteristic, disconnect
//! - Define the **driving/inbound port** `MetricsSource` that the exposition
//!   endpoint calls on every scrape
//! - Own the `DeviceSession` connection state machine and the
//!   `MetricsCollector` that serializes acquisition cycles
//! - Decide which failures are terminal (`FailurePolicy`) and run the
//!   optional background `Poller`
//!
//! ## Dependency rule
//! Depends on `waveplus-domain` only (plus `tokio` for locking, timers and
//! spawning). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod collector;
pub mod failure;
pub mod poller;
pub mod ports;
pub mod session;

#[cfg(test)]
mod testing;
