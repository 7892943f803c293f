//! Prometheus metrics for the exporter.
//!
//! All metrics live in an explicit registry owned by [`ExporterMetrics`],
//! which is shared between the poll loop (writes) and the HTTP handler
//! (gather + encode).

use crate::summary::WindowSummary;
use prometheus::{
    register_gauge_vec_with_registry, Encoder, GaugeVec, Registry, TextEncoder,
};
use std::collections::HashMap;

/// Raw variables that get a min/max/mean window in addition to their live
/// gauge entry: raw name, metric name suffix, help text. Fixed at startup.
const TRACKED_VARS: [(&str, &str, &str); 4] = [
    ("VIN", "voltage_in", "Voltage in (mV)"),
    ("VOUT", "voltage_out", "Voltage out (mV)"),
    ("VBAT", "voltage_bat", "Battery voltage (mV)"),
    ("IOUT", "current_out", "Current out (mA)"),
];

/// Metrics registry for the exporter.
pub struct ExporterMetrics {
    /// Live value of every variable the tool has ever reported, by `var`
    pub vars: GaugeVec,
    /// Aggregation windows for the tracked raw variables, by raw name
    pub summaries: HashMap<&'static str, WindowSummary>,
    /// Aggregation window for derived output power (mW)
    pub power_out: WindowSummary,

    registry: Registry,
}

impl ExporterMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let vars = register_gauge_vec_with_registry!(
            "lifepo4wered",
            "Variables gathered from the lifepo4wered-cli tool",
            &["var"],
            registry
        )
        .unwrap();

        let mut summaries = HashMap::new();
        for (var, suffix, help) in TRACKED_VARS {
            let summary =
                WindowSummary::new(&format!("lifepo4wered_{}", suffix), help).unwrap();
            registry.register(Box::new(summary.clone())).unwrap();
            summaries.insert(var, summary);
        }

        let power_out = WindowSummary::new("lifepo4wered_power_out", "Power out (mW)").unwrap();
        registry.register(Box::new(power_out.clone())).unwrap();

        Self {
            vars,
            summaries,
            power_out,
            registry,
        }
    }

    /// Export metrics in Prometheus text format.
    ///
    /// Gathering collects every [`WindowSummary`], which resets its window.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}
