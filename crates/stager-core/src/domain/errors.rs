//! Error types shared by the ports and the outbox.

use thiserror::Error;

use super::{StagingDomain, TaskGuid};
use crate::domain::state::TaskState;

/// Errors reported by a task store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskGuid),

    /// The task is not in a state that allows the requested transition.
    /// For `claim_resolving` this means another instance won the claim.
    #[error("task {guid} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        guid: TaskGuid,
        from: TaskState,
        to: TaskState,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the message bus.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish to {subject} failed: {reason}")]
    Transport { subject: String, reason: String },

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A task's documents do not match the staging contract.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(#[source] serde_json::Error),

    #[error("malformed {domain} result: {source}")]
    MalformedResult {
        domain: StagingDomain,
        #[source]
        source: serde_json::Error,
    },
}
