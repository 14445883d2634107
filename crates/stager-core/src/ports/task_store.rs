//! TaskStore port - the coordination store that owns task state.
//!
//! The store is the only place exclusivity is decided: `claim_resolving`
//! must have single-winner semantics for concurrent claimants of the same
//! guid. The outbox never keeps its own record of claimed tasks.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{StoreError, Task, TaskGuid};

/// A live subscription to the store's completed-task feed.
///
/// Dropping the watch without calling [`TaskWatch::stop`] also ends the
/// subscription, since the stop signal's sender goes away with it.
#[derive(Debug)]
pub struct TaskWatch {
    pub tasks: mpsc::UnboundedReceiver<Task>,
    pub errors: mpsc::UnboundedReceiver<StoreError>,
    stop: oneshot::Sender<()>,
}

impl TaskWatch {
    pub fn new(
        tasks: mpsc::UnboundedReceiver<Task>,
        errors: mpsc::UnboundedReceiver<StoreError>,
        stop: oneshot::Sender<()>,
    ) -> Self {
        Self {
            tasks,
            errors,
            stop,
        }
    }

    /// Ask the store to end this subscription.
    pub fn stop(self) {
        // the store may already have torn the feed down
        let _ = self.stop.send(());
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Subscribe to tasks as they complete.
    async fn watch_completed_tasks(&self) -> TaskWatch;

    /// Take the exclusive right to deliver a task's result.
    /// Fails if another instance already holds (or finished) the claim.
    async fn claim_resolving(&self, guid: &TaskGuid) -> Result<(), StoreError>;

    /// Mark a claimed task finished and drop it from the active set.
    async fn resolve(&self, guid: &TaskGuid) -> Result<(), StoreError>;
}
