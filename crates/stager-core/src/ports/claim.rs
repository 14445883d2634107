//! ClaimCoordinator port - cross-instance exclusivity for one task.

use async_trait::async_trait;

use crate::domain::TaskGuid;

/// Grants at most one caller the right to deliver a given task.
///
/// Backed by whatever the deployment offers with single-winner semantics
/// (a consistent key-value store, a row lock, ...). `false` means the task
/// belongs to someone else and the caller must walk away.
#[async_trait]
pub trait ClaimCoordinator: Send + Sync {
    async fn try_claim(&self, guid: &TaskGuid) -> bool;
}
