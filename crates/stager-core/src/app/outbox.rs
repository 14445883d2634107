//! Outbox - top-level lifecycle of one relay instance.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

use super::dispatcher::{Dispatcher, DrainReport};
use super::pipeline::ResolutionPipeline;
use super::supervisor::WatchSupervisor;
use crate::config::OutboxConfig;

/// Relays completed staging tasks to requesters until told to stop.
///
/// Built by [`OutboxBuilder`](super::builder::OutboxBuilder).
pub struct Outbox {
    supervisor: WatchSupervisor,
    pipeline: Arc<ResolutionPipeline>,
    config: OutboxConfig,
}

impl Outbox {
    pub(crate) fn new(
        supervisor: WatchSupervisor,
        pipeline: Arc<ResolutionPipeline>,
        config: OutboxConfig,
    ) -> Self {
        Self {
            supervisor,
            pipeline,
            config,
        }
    }

    pub fn config(&self) -> &OutboxConfig {
        &self.config
    }

    /// Watch and relay until `shutdown` turns true, then drain.
    ///
    /// In-flight pipelines are not cancelled. Shutdown waits for them up to
    /// the configured drain timeout and leaves the rest running detached.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> DrainReport {
        info!(
            max_in_flight = self.config.max_in_flight,
            "outbox started"
        );
        let mut dispatcher = Dispatcher::new(Arc::clone(&self.pipeline), self.config.max_in_flight);

        self.supervisor.run(&mut dispatcher, &mut shutdown).await;

        let report = dispatcher.drain(self.config.drain_timeout()).await;
        info!(
            completed = report.completed,
            abandoned = report.abandoned,
            "outbox stopped"
        );
        report
    }

    /// Run on the tokio runtime and return a handle to stop it.
    pub fn spawn(self) -> OutboxHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        OutboxHandle { shutdown_tx, join }
    }
}

/// Handle to a spawned outbox.
/// Dropping it also stops the outbox, since the shutdown sender goes away.
pub struct OutboxHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<DrainReport>,
}

impl OutboxHandle {
    /// Stop watching. In-flight pipelines keep going until drained.
    pub fn request_shutdown(&self) {
        // ignore send error: the outbox may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) -> Result<DrainReport, JoinError> {
        self.request_shutdown();
        self.join.await
    }
}
