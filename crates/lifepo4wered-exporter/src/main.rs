//! lifepo4wered-exporter - Prometheus exporter for the LiFePO4wered/Pi
//!
//! Polls the lifepo4wered-cli tool, keeps min/max/mean windows per tracked
//! variable, and serves everything over HTTP for scraping.

use anyhow::{Context, Result};
use clap::Parser;
use lifepo4wered_exporter::cli::Cli;
use lifepo4wered_exporter::metrics::ExporterMetrics;
use lifepo4wered_exporter::poller::{self, Poller};
use lifepo4wered_exporter::server::{self, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    info!("lifepo4wered-exporter v{} starting", env!("CARGO_PKG_VERSION"));

    let metrics = Arc::new(ExporterMetrics::new());
    let poller = Poller::new(Arc::clone(&metrics));

    // One cycle before serving, so the first scrape already has data
    poller
        .poll()
        .await
        .context("initial poll of lifepo4wered-cli failed")?;

    poller::spawn_poll_loop(poller, Duration::from_secs(cli.poll_interval_secs));

    server::run(AppState::new(metrics), &cli.listen_address).await
}
