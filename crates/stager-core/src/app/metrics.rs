//! Staging outcome metrics.

use std::sync::Arc;

use crate::ports::MetricSink;

pub const STAGING_REQUESTS_SUCCEEDED: &str = "StagingRequestsSucceeded";
pub const STAGING_REQUESTS_FAILED: &str = "StagingRequestsFailed";
pub const STAGING_SUCCEEDED_DURATION: &str = "StagingRequestSucceededDuration";
pub const STAGING_FAILED_DURATION: &str = "StagingRequestFailedDuration";

/// Unit attached to duration samples.
pub const NANOS: &str = "nanos";

/// Outcome of a staging request as seen by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingOutcome {
    Succeeded,
    Failed,
}

impl StagingOutcome {
    fn counter(self) -> &'static str {
        match self {
            Self::Succeeded => STAGING_REQUESTS_SUCCEEDED,
            Self::Failed => STAGING_REQUESTS_FAILED,
        }
    }

    fn duration(self) -> &'static str {
        match self {
            Self::Succeeded => STAGING_SUCCEEDED_DURATION,
            Self::Failed => STAGING_FAILED_DURATION,
        }
    }
}

/// Emits one counter increment and one duration sample per delivered task.
#[derive(Clone)]
pub struct StagingMetrics {
    sink: Arc<dyn MetricSink>,
}

impl StagingMetrics {
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self { sink }
    }

    pub fn record(&self, outcome: StagingOutcome, duration_nanos: i64) {
        self.sink.increment_counter(outcome.counter());
        self.sink
            .send_value(outcome.duration(), duration_nanos as f64, NANOS);
    }
}
