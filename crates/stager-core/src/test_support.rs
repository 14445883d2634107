//! Helpers shared by the async tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::app::metrics::StagingMetrics;
use crate::app::pipeline::ResolutionPipeline;
use crate::domain::{BUILDPACK_TASK_DOMAIN, PublishError, Task};
use crate::impls::{InMemoryBus, InMemoryMetricSink, InMemoryTaskStore, StoreClaimCoordinator};
use crate::ports::{FixedClock, MessageBus};

pub const BUILDPACK_RESULT: &str = r#"{"buildpack_key":"bp","detected_buildpack":"Some Buildpack","execution_metadata":"{\"start_command\":\"./run\"}","detected_start_command":{"web":"./run"}}"#;

pub const ANNOTATION: &str = r#"{"app_id":"A","task_id":"T"}"#;

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Assert `condition` keeps holding for a short while.
pub async fn consistently(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(100);
    while tokio::time::Instant::now() < deadline {
        assert!(condition(), "condition stopped holding");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    ))
}

pub fn buildpack_task(guid: &str, created_at: i64) -> Task {
    Task::new(guid, BUILDPACK_TASK_DOMAIN, created_at)
        .with_result(BUILDPACK_RESULT)
        .with_annotation(ANNOTATION)
}

pub fn pipeline(
    store: Arc<InMemoryTaskStore>,
    bus: Arc<dyn MessageBus>,
    sink: Arc<InMemoryMetricSink>,
    clock: Arc<FixedClock>,
) -> Arc<ResolutionPipeline> {
    Arc::new(ResolutionPipeline::new(
        Arc::new(StoreClaimCoordinator::new(store.clone())),
        store,
        bus,
        StagingMetrics::new(sink),
        clock,
    ))
}

/// A bus whose publishes block until the test lets them through.
pub struct StallingBus {
    pub inner: InMemoryBus,
    gate: Semaphore,
    entered: AtomicUsize,
}

impl StallingBus {
    pub fn new() -> Self {
        Self {
            inner: InMemoryBus::new(),
            gate: Semaphore::new(0),
            entered: AtomicUsize::new(0),
        }
    }

    /// Let `n` blocked (or future) publishes complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Publishes that have started, finished or not.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageBus for StallingBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.publish(subject, payload).await
    }
}
