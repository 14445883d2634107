//! InMemoryTaskStore - development stand-in for the coordination store.
//!
//! Besides the `TaskStore` contract it exposes hooks to complete tasks,
//! break the watch feed, inject claim/resolve failures and count calls.
//!
//! Watch semantics: a new subscription first replays every task that is
//! still claimable, then receives tasks as they complete. Replaying can
//! hand the same task to more than one watcher; the claim sorts that out.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::record::TaskRecord;
use crate::domain::{StoreError, Task, TaskGuid, TaskState};
use crate::observability::StoreCounts;
use crate::ports::{TaskStore, TaskWatch};

struct Watcher {
    tasks: mpsc::UnboundedSender<Task>,
    errors: mpsc::UnboundedSender<StoreError>,
    stop: oneshot::Receiver<()>,
}

impl Watcher {
    /// Still subscribed? Either side hanging up ends the subscription.
    fn is_live(&mut self) -> bool {
        !self.tasks.is_closed()
            && matches!(self.stop.try_recv(), Err(oneshot::error::TryRecvError::Empty))
    }
}

#[derive(Default)]
struct StoreState {
    records: HashMap<TaskGuid, TaskRecord>,

    /// Guids in completion order, for deterministic replay.
    order: Vec<TaskGuid>,

    watchers: Vec<Watcher>,

    watch_calls: usize,
    claim_calls: usize,
    resolve_calls: Vec<TaskGuid>,

    claim_failure: Option<String>,
    resolve_failure: Option<String>,
}

impl StoreState {
    fn prune_watchers(&mut self) {
        self.watchers.retain_mut(Watcher::is_live);
    }

    fn broadcast(&mut self, task: &Task) {
        self.prune_watchers();
        for watcher in &self.watchers {
            // a receiver dropped since pruning is picked up next time
            let _ = watcher.tasks.send(task.clone());
        }
    }
}

#[derive(Default)]
pub struct InMemoryTaskStore {
    state: Mutex<StoreState>,

    /// Claims older than this are released by `reap_expired_claims`.
    claim_ttl: Option<Duration>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim_ttl(mut self, ttl: Duration) -> Self {
        self.claim_ttl = Some(ttl);
        self
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a finished task and push it to every live watcher.
    ///
    /// Completing a guid that is already known replaces the record.
    pub fn complete_task(&self, task: Task) {
        let mut state = self.lock();
        let guid = task.guid.clone();
        if state
            .records
            .insert(guid.clone(), TaskRecord::completed(task.clone()))
            .is_none()
        {
            state.order.push(guid);
        }
        state.broadcast(&task);
    }

    /// Break every live subscription's feed with an `Unavailable` error.
    /// Returns how many watchers were told.
    pub fn fail_watch(&self, reason: impl Into<String>) -> usize {
        let mut state = self.lock();
        state.prune_watchers();
        let reason = reason.into();
        let mut notified = 0;
        for watcher in &state.watchers {
            if watcher
                .errors
                .send(StoreError::Unavailable(reason.clone()))
                .is_ok()
            {
                notified += 1;
            }
        }
        notified
    }

    /// Refuse every subsequent claim with `reason`.
    pub fn fail_claims_with(&self, reason: impl Into<String>) {
        self.lock().claim_failure = Some(reason.into());
    }

    /// Refuse every subsequent resolve with `reason`.
    pub fn fail_resolves_with(&self, reason: impl Into<String>) {
        self.lock().resolve_failure = Some(reason.into());
    }

    /// Release claims held longer than the configured TTL and hand the
    /// tasks to live watchers again. Returns the released guids.
    pub fn reap_expired_claims(&self) -> Vec<TaskGuid> {
        let Some(ttl) = self.claim_ttl else {
            return Vec::new();
        };
        let now = Instant::now();
        let mut state = self.lock();
        let mut released = Vec::new();
        for guid in state.order.clone() {
            let Some(record) = state.records.get_mut(&guid) else {
                continue;
            };
            let expired = record.state == TaskState::Resolving
                && record
                    .claimed_at
                    .is_some_and(|at| now.saturating_duration_since(at) >= ttl);
            if expired {
                record.release();
                let task = record.task.clone();
                state.broadcast(&task);
                released.push(guid);
            }
        }
        released
    }

    pub fn state_of(&self, guid: &TaskGuid) -> Option<TaskState> {
        self.lock().records.get(guid).map(|r| r.state)
    }

    pub fn watch_call_count(&self) -> usize {
        self.lock().watch_calls
    }

    pub fn claim_call_count(&self) -> usize {
        self.lock().claim_calls
    }

    /// Guids passed to `resolve`, in call order.
    pub fn resolve_calls(&self) -> Vec<TaskGuid> {
        self.lock().resolve_calls.clone()
    }

    pub fn active_watch_count(&self) -> usize {
        let mut state = self.lock();
        state.prune_watchers();
        state.watchers.len()
    }

    pub fn counts_by_state(&self) -> StoreCounts {
        let state = self.lock();
        let mut counts = StoreCounts::default();
        for record in state.records.values() {
            match record.state {
                TaskState::Completed => counts.completed += 1,
                TaskState::Resolving => counts.resolving += 1,
                TaskState::Resolved => counts.resolved += 1,
            }
        }
        counts
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn watch_completed_tasks(&self) -> TaskWatch {
        let (tasks_tx, tasks_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let mut state = self.lock();
        state.watch_calls += 1;
        for guid in &state.order {
            if let Some(record) = state.records.get(guid)
                && record.state.is_claimable()
            {
                let _ = tasks_tx.send(record.task.clone());
            }
        }
        state.watchers.push(Watcher {
            tasks: tasks_tx,
            errors: errors_tx,
            stop: stop_rx,
        });

        TaskWatch::new(tasks_rx, errors_rx, stop_tx)
    }

    async fn claim_resolving(&self, guid: &TaskGuid) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.claim_calls += 1;
        if let Some(reason) = &state.claim_failure {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        let record = state
            .records
            .get_mut(guid)
            .ok_or_else(|| StoreError::TaskNotFound(guid.clone()))?;
        if !record.state.is_claimable() {
            return Err(StoreError::InvalidTransition {
                guid: guid.clone(),
                from: record.state,
                to: TaskState::Resolving,
            });
        }
        record.claim();
        Ok(())
    }

    async fn resolve(&self, guid: &TaskGuid) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.resolve_calls.push(guid.clone());
        if let Some(reason) = &state.resolve_failure {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        let record = state
            .records
            .get_mut(guid)
            .ok_or_else(|| StoreError::TaskNotFound(guid.clone()))?;
        if record.state != TaskState::Resolving {
            return Err(StoreError::InvalidTransition {
                guid: guid.clone(),
                from: record.state,
                to: TaskState::Resolved,
            });
        }
        record.resolve();
        Ok(())
    }
}
