//! Dispatcher - hands completed tasks to concurrently running pipelines.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use super::pipeline::{Resolution, ResolutionPipeline};
use crate::domain::Task;

/// Result of waiting for in-flight pipelines at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Pipelines that finished while draining.
    pub completed: usize,
    /// Pipelines still running when the drain timeout hit; left detached.
    pub abandoned: usize,
}

/// Supervised spawner with a concurrency ceiling.
///
/// `dispatch` never waits: every task gets its own tokio task right away,
/// and that task waits for a permit before running the pipeline. The
/// ceiling therefore bounds in-flight claims and publishes, not the number
/// of queued tasks.
pub struct Dispatcher {
    pipeline: Arc<ResolutionPipeline>,
    permits: Arc<Semaphore>,
    in_flight: JoinSet<Resolution>,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<ResolutionPipeline>, max_in_flight: usize) -> Self {
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            in_flight: JoinSet::new(),
        }
    }

    pub fn dispatch(&mut self, task: Task) {
        self.reap_finished();

        let pipeline = Arc::clone(&self.pipeline);
        let permits = Arc::clone(&self.permits);
        self.in_flight.spawn(async move {
            // the semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            pipeline.process(task).await
        });
    }

    /// Number of spawned pipelines not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Collect pipelines that already finished, without waiting.
    pub fn reap_finished(&mut self) {
        while let Some(joined) = self.in_flight.try_join_next() {
            if let Err(err) = joined {
                error!(error = %err, "resolution pipeline panicked");
            }
        }
    }

    /// Wait up to `timeout` for every in-flight pipeline.
    pub async fn drain(mut self, timeout: Duration) -> DrainReport {
        let mut report = DrainReport::default();

        let waited = tokio::time::timeout(timeout, async {
            while let Some(joined) = self.in_flight.join_next().await {
                if let Err(err) = joined {
                    error!(error = %err, "resolution pipeline panicked");
                }
                report.completed += 1;
            }
        })
        .await;

        if waited.is_err() {
            report.abandoned = self.in_flight.len();
            warn!(abandoned = report.abandoned, "drain timed out");
            self.in_flight.detach_all();
        }
        report
    }
}
