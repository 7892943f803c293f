//! Min/max/mean aggregation windows that reset on every scrape.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use std::sync::{Arc, Mutex};

/// One window's worth of statistics, taken at reset time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSnapshot {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: u64,
}

struct Window {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl Window {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }
}

/// A gauge tracking min/max/mean of all values observed since the last
/// scrape. Being collected through the registry resets the window, so each
/// scrape sees exactly the observations made since the previous one.
///
/// Clones share the underlying window: one clone lives in the registry while
/// another is observed into by the poll loop.
#[derive(Clone)]
pub struct WindowSummary {
    window: Arc<Mutex<Window>>,
    gauge: GaugeVec,
}

impl WindowSummary {
    pub fn new(name: &str, help: &str) -> prometheus::Result<Self> {
        let gauge = GaugeVec::new(Opts::new(name, help), &["stat"])?;
        Ok(Self {
            window: Arc::new(Mutex::new(Window::new())),
            gauge,
        })
    }

    /// Fold one value into the current window.
    pub fn observe(&self, x: f64) {
        let mut w = self.window.lock().unwrap();
        w.min = w.min.min(x);
        w.max = w.max.max(x);
        w.sum += x;
        w.count += 1;
    }

    /// Take the current window's statistics and start a new window.
    ///
    /// An empty window reports min = +inf, max = -inf, mean = 0. No
    /// observation is lost or double counted across the reset boundary.
    pub fn read_and_reset(&self) -> WindowSnapshot {
        let mut w = self.window.lock().unwrap();
        let mut mean = w.sum;
        if w.count > 0 {
            mean /= w.count as f64;
        }
        let snapshot = WindowSnapshot {
            min: w.min,
            max: w.max,
            mean,
            count: w.count,
        };
        *w = Window::new();
        snapshot
    }
}

impl Collector for WindowSummary {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.read_and_reset();
        self.gauge.with_label_values(&["min"]).set(snapshot.min);
        self.gauge.with_label_values(&["max"]).set(snapshot.max);
        self.gauge.with_label_values(&["mean"]).set(snapshot.mean);
        self.gauge.collect()
    }
}
