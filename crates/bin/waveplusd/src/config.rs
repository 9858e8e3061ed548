//! Configuration loading: TOML file, then environment variables, then CLI
//! flags.
//!
//! Looks for `waveplus.toml` in the working directory unless `--config`
//! names another file. Every field except the serial number has a sensible
//! default so the file is optional.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use waveplus_adapter_ble::BleConfig;
use waveplus_app::failure::FailurePolicy;
use waveplus_app::session::DiscoveryConfig;

use crate::cli::Args;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "waveplus.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target sensor.
    pub device: DeviceConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Background polling.
    pub poll: PollConfig,
    /// Bluetooth settings.
    pub ble: BleSettings,
    /// Failure handling.
    pub collector: CollectorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Sensor selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Serial number printed on the back of the sensor.
    pub serial_number: Option<u32>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Background poll loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between two cycles; `0` disables the loop.
    pub period_secs: u64,
}

/// Discovery bounds, cycle deadline and adapter selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BleSettings {
    /// Host adapter selection.
    #[serde(flatten)]
    pub transport: BleConfig,
    /// Scan windows before discovery gives up.
    pub max_scan_attempts: u32,
    /// Length of one scan window in milliseconds.
    pub scan_window_ms: u64,
    /// Deadline of one acquisition cycle; `0` disables it.
    pub cycle_timeout_secs: u64,
}

/// Failure policy configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Stop the exporter on any failed cycle. When `false`, only fatal errors
    /// stop it and transient ones fail a single scrape.
    pub fail_fast: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the file selected by `args`, apply
    /// environment-variable overrides, then the CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if `--config` names a file
    /// that cannot be read, or if the result fails validation.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(Path::new(DEFAULT_CONFIG_FILE))?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("WAVEPLUS_SERIAL_NUMBER") {
            self.device.serial_number = Some(parse_env("WAVEPLUS_SERIAL_NUMBER", &val)?);
        }
        if let Some(val) = var("WAVEPLUS_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("WAVEPLUS_PORT") {
            self.server.port = parse_env("WAVEPLUS_PORT", &val)?;
        }
        if let Some(val) = var("WAVEPLUS_PERIOD_SECS") {
            self.poll.period_secs = parse_env("WAVEPLUS_PERIOD_SECS", &val)?;
        }
        if let Some(val) = var("WAVEPLUS_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(serial_number) = args.serial_number {
            self.device.serial_number = Some(serial_number);
        }
        if let Some(bind) = &args.bind {
            self.server.host.clone_from(bind);
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(period) = args.period_seconds {
            self.poll.period_secs = period;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.serial_number()?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.ble.max_scan_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_scan_attempts must be non-zero".to_string(),
            ));
        }
        if self.ble.scan_window_ms == 0 {
            return Err(ConfigError::Validation(
                "scan_window_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Serial number of the target sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when no serial number is configured.
    pub fn serial_number(&self) -> Result<u32, ConfigError> {
        self.device.serial_number.ok_or_else(|| {
            ConfigError::Validation(
                "serial number is required (--serialnumber, WAVEPLUS_SERIAL_NUMBER or [device] serial_number)"
                    .to_string(),
            )
        })
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Discovery bounds for the device session.
    #[must_use]
    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_attempts: self.ble.max_scan_attempts,
            scan_window: Duration::from_millis(self.ble.scan_window_ms),
        }
    }

    /// Per-cycle deadline, `None` when disabled.
    #[must_use]
    pub fn cycle_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.ble.cycle_timeout_secs)
    }

    /// Poll period, `None` when polling is disabled.
    #[must_use]
    pub fn poll_period(&self) -> Option<Duration> {
        non_zero_secs(self.poll.period_secs)
    }

    /// Policy deciding which failed cycles stop the exporter.
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_fail_fast(self.collector.fail_fast)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError> {
    val.parse()
        .map_err(|_| ConfigError::Validation(format!("{key} has an invalid value: {val:?}")))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9744,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { period_secs: 60 }
    }
}

impl Default for BleSettings {
    fn default() -> Self {
        Self {
            transport: BleConfig::default(),
            max_scan_attempts: 50,
            scan_window_ms: 100,
            cycle_timeout_secs: 30,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "waveplusd=info,waveplus=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
