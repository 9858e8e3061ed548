//! Command-line flags. Every flag overrides the file and environment value.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(name = "waveplusd", version, about = "Airthings Wave Plus Prometheus exporter")]
pub struct Args {
    /// Configuration file (defaults to `waveplus.toml` when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Serial number of the sensor, as printed on its back.
    #[arg(long = "serialnumber", value_name = "SERIAL")]
    pub serial_number: Option<u32>,

    /// Port of the metrics endpoint.
    #[arg(long)]
    pub port: Option<u16>,

    /// Address the metrics endpoint binds to.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Background poll period in seconds, `0` disables polling.
    #[arg(long = "periodseconds", value_name = "SECONDS")]
    pub period_seconds: Option<u64>,
}
