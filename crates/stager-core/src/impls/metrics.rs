//! MetricSink implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::MetricSink;

/// A recorded value sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub unit: String,
}

#[derive(Default)]
struct Recorded {
    counters: HashMap<String, u64>,
    values: HashMap<String, Metric>,
}

/// Keeps every metric in memory so tests can assert exact values.
#[derive(Default)]
pub struct InMemoryMetricSink {
    recorded: Mutex<Recorded>,
}

impl InMemoryMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.lock().counters.get(name).copied().unwrap_or(0)
    }

    /// Latest sample sent for `name`.
    pub fn value(&self, name: &str) -> Option<Metric> {
        self.lock().values.get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MetricSink for InMemoryMetricSink {
    fn increment_counter(&self, name: &str) {
        *self.lock().counters.entry(name.to_string()).or_insert(0) += 1;
    }

    fn send_value(&self, name: &str, value: f64, unit: &str) {
        self.lock().values.insert(
            name.to_string(),
            Metric {
                value,
                unit: unit.to_string(),
            },
        );
    }
}

/// Emits metrics as structured `tracing` events under the `metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricSink;

impl MetricSink for TracingMetricSink {
    fn increment_counter(&self, name: &str) {
        tracing::info!(target: "metrics", metric = name, delta = 1u64, "counter");
    }

    fn send_value(&self, name: &str, value: f64, unit: &str) {
        tracing::info!(target: "metrics", metric = name, value, unit, "value");
    }
}
