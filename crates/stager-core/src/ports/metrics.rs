//! MetricSink port - where counters and value samples end up.

/// Receives metric updates.
///
/// Counters are monotonically increasing; values are latest-value samples
/// that replace the previous one for the same name.
pub trait MetricSink: Send + Sync {
    fn increment_counter(&self, name: &str);

    fn send_value(&self, name: &str, value: f64, unit: &str);
}
