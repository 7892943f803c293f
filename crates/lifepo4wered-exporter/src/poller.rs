//! Poll cycles - run the telemetry tool and fold its output into the metrics.

use crate::error::PollError;
use crate::metrics::ExporterMetrics;
use crate::parser::{self, Sample};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error};

/// Fixed tool invocation: `lifepo4wered-cli get` dumps every variable the
/// module exposes, one `NAME = VALUE` line each.
const PRODUCER: &str = "lifepo4wered-cli";
const PRODUCER_ARGS: [&str; 1] = ["get"];

/// Multiplicative accumulator for the derived output-power metric.
///
/// Seeded at 1 per poll cycle, multiplied by the raw VOUT (mV) and IOUT (mA)
/// readings as they are seen, scaled to milliwatts when the cycle ends
/// (mV * mA = uW, 1000 uW = 1 mW). The tool emits each variable exactly once
/// per run; a cycle that omits or repeats one of the inputs skews the
/// product accordingly, with no validation.
struct PowerAccumulator {
    product: i64,
}

impl PowerAccumulator {
    fn new() -> Self {
        Self { product: 1 }
    }

    fn fold(&mut self, sample: &Sample) {
        if sample.name == "VOUT" || sample.name == "IOUT" {
            self.product *= sample.value;
        }
    }

    fn finish(self) -> f64 {
        self.product as f64 / 1e3
    }
}

/// Runs collection cycles against the tool and applies them to the metrics.
pub struct Poller {
    metrics: Arc<ExporterMetrics>,
}

impl Poller {
    pub fn new(metrics: Arc<ExporterMetrics>) -> Self {
        Self { metrics }
    }

    /// Run one full collection cycle.
    pub async fn poll(&self) -> Result<(), PollError> {
        let output =
            tokio::task::spawn_blocking(|| Command::new(PRODUCER).args(PRODUCER_ARGS).output())
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        if !output.status.success() {
            return Err(PollError::ProducerFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        self.apply_output(&stdout)
    }

    /// Parse a full stdout capture and apply it to the metrics.
    ///
    /// Every line is parsed before anything is applied, so a malformed line
    /// leaves no partial update behind.
    pub fn apply_output(&self, stdout: &str) -> Result<(), PollError> {
        let samples = stdout
            .lines()
            .map(parser::parse_line)
            .collect::<Result<Vec<_>, _>>()?;

        let mut power = PowerAccumulator::new();
        for sample in &samples {
            self.metrics
                .vars
                .with_label_values(&[sample.name.as_str()])
                .set(sample.value as f64);

            if let Some(summary) = self.metrics.summaries.get(sample.name.as_str()) {
                summary.observe(sample.value as f64);
            }
            power.fold(sample);
        }
        self.metrics.power_out.observe(power.finish());

        debug!("Applied {} samples", samples.len());
        Ok(())
    }
}

/// Spawn the background poll loop: one cycle every `poll_interval`, forever.
///
/// The caller is expected to have run one cycle already, so the interval's
/// immediate first tick is consumed before looping. Any poll error ends the
/// process.
pub fn spawn_poll_loop(poller: Poller, poll_interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(poll_interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = poller.poll().await {
                error!("Poll cycle failed: {}", e);
                std::process::exit(1);
            }
        }
    });
}
