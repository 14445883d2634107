//! Store-side lifecycle of a completed task.

use serde::{Deserialize, Serialize};

/// State of a completed task in the coordination store.
///
/// State transitions:
/// - Completed -> Resolving (exclusive claim by one outbox instance)
/// - Resolving -> Resolved (after the response was published)
///
/// A task that stays in Resolving was claimed by an instance whose publish
/// failed; the store's claim expiry (or an operator) moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Finished by a worker, waiting for an outbox to claim it.
    Completed,

    /// Claimed by an outbox instance that is delivering the response.
    Resolving,

    /// Response delivered; the task has left the active set.
    Resolved,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Resolved)
    }

    /// Can an outbox instance still claim this task?
    pub fn is_claimable(self) -> bool {
        matches!(self, TaskState::Completed)
    }
}
