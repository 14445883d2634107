//! Task record: a completed task plus its store-side state.

use std::time::Instant;

use crate::domain::{Task, TaskState};

/// One entry of the in-memory store.
///
/// All state transitions go through these methods so the timestamps stay
/// consistent with the state.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task: Task,
    pub state: TaskState,

    /// Number of successful claims, including ones that later expired.
    pub claims: u32,

    /// When the current claim was taken (Resolving only).
    pub claimed_at: Option<Instant>,

    pub completed_at: Instant,
    pub updated_at: Instant,
}

impl TaskRecord {
    pub fn completed(task: Task) -> Self {
        let now = Instant::now();
        Self {
            task,
            state: TaskState::Completed,
            claims: 0,
            claimed_at: None,
            completed_at: now,
            updated_at: now,
        }
    }

    pub fn claim(&mut self) {
        let now = Instant::now();
        self.state = TaskState::Resolving;
        self.claims += 1;
        self.claimed_at = Some(now);
        self.updated_at = now;
    }

    pub fn resolve(&mut self) {
        self.state = TaskState::Resolved;
        self.claimed_at = None;
        self.updated_at = Instant::now();
    }

    /// Give up an expired claim so another instance can pick the task up.
    pub fn release(&mut self) {
        self.state = TaskState::Completed;
        self.claimed_at = None;
        self.updated_at = Instant::now();
    }
}
