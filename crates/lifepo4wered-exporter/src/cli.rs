//! CLI - Command-line argument parsing
//!
//! Defines the daemon flags using clap.

use clap::Parser;

/// Prometheus exporter for the LiFePO4wered/Pi power module
#[derive(Parser, Debug)]
#[command(name = "lifepo4wered-exporter")]
#[command(about = "Serves Prometheus metrics gathered from lifepo4wered-cli", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The address to listen on for HTTP requests
    #[arg(long, default_value = "0.0.0.0:9454")]
    pub listen_address: String,

    /// Seconds between executions of `lifepo4wered-cli get`
    #[arg(long, default_value_t = 1)]
    pub poll_interval_secs: u64,
}
