//! MessageBus port - publish/subscribe transport towards the requester.

use async_trait::async_trait;

use crate::domain::PublishError;

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish one payload. Returns once the transport accepted or refused it.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}
