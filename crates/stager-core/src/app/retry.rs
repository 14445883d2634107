//! Retry policy: decides how long to wait before watching the store again.

use std::time::Duration;

use rand::Rng;

/// Fixed-interval policy for re-subscribing to the completed-task feed.
///
/// There is no attempt limit; the feed is re-established for as long as
/// the process runs. The interval stays coarse so a degraded store is not
/// hammered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a feed error and the next subscription.
    pub interval: Duration,

    /// Upper bound of a uniformly random extra delay. Zero disables jitter.
    pub jitter: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before re-subscribing after the `attempt`-th consecutive error
    /// (1-indexed). The interval does not grow with the attempt count.
    pub fn next_delay(&self, _attempt: u32) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let extra = rand::thread_rng().gen_range(Duration::ZERO..=self.jitter);
        self.interval + extra
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_INTERVAL)
    }
}
