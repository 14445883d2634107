//! StoreClaimCoordinator - claims backed by the task store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{StoreError, TaskGuid};
use crate::ports::{ClaimCoordinator, TaskStore};

/// Maps `TaskStore::claim_resolving` onto the claim capability.
///
/// Any refusal means "not yours": a lost race is expected and only traced,
/// while other store errors are logged before walking away.
pub struct StoreClaimCoordinator {
    store: Arc<dyn TaskStore>,
}

impl StoreClaimCoordinator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClaimCoordinator for StoreClaimCoordinator {
    async fn try_claim(&self, guid: &TaskGuid) -> bool {
        match self.store.claim_resolving(guid).await {
            Ok(()) => true,
            Err(err @ StoreError::InvalidTransition { .. }) => {
                debug!(task_guid = %guid, error = %err, "claim refused");
                false
            }
            Err(err) => {
                warn!(task_guid = %guid, error = %err, "claim failed");
                false
            }
        }
    }
}
