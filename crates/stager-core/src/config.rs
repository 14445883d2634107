//! Outbox configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::retry::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_in_flight must be at least 1")]
    ZeroConcurrency,

    #[error("resubscribe_interval_ms must be greater than zero")]
    ZeroResubscribeInterval,
}

/// Tunables of one outbox instance. Durations are in milliseconds so the
/// struct reads naturally from JSON or environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    /// Wait between a watch error and the next subscription.
    pub resubscribe_interval_ms: u64,

    /// Upper bound of random extra wait added to the interval.
    pub resubscribe_jitter_ms: u64,

    /// Ceiling on resolution pipelines running at the same time.
    pub max_in_flight: usize,

    /// How long shutdown waits for in-flight pipelines.
    pub drain_timeout_ms: u64,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            resubscribe_interval_ms: 3_000,
            resubscribe_jitter_ms: 0,
            max_in_flight: 64,
            drain_timeout_ms: 10_000,
        }
    }
}

impl OutboxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_in_flight == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.resubscribe_interval_ms == 0 {
            return Err(ConfigError::ZeroResubscribeInterval);
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(self.resubscribe_interval_ms))
            .with_jitter(Duration::from_millis(self.resubscribe_jitter_ms))
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}
