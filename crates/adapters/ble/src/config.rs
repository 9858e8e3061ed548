//! BLE adapter configuration.

use serde::Deserialize;

/// Configuration for the btleplug transport.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// Host adapter to use, matched against the adapter description
    /// (e.g. `"hci1"`).
    ///
    /// When unset, the first adapter reported by the OS is used.
    pub adapter: Option<String>,
}

impl BleConfig {
    /// Whether an adapter with description `info` satisfies this configuration.
    #[must_use]
    pub fn matches_adapter(&self, info: &str) -> bool {
        self.adapter
            .as_deref()
            .is_none_or(|wanted| info.to_ascii_lowercase().contains(&wanted.to_ascii_lowercase()))
    }
}
