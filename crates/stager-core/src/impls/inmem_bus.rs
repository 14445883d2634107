//! InMemoryBus - development stand-in for the pub/sub transport.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::PublishError;
use crate::ports::MessageBus;

/// A message accepted by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Vec<u8>,
}

#[derive(Default)]
struct BusState {
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<Vec<u8>>>>,
    failures: HashMap<String, String>,
    published: Vec<PublishedMessage>,
}

/// Delivers every accepted payload to the subject's current subscribers.
#[derive(Default)]
pub struct InMemoryBus {
    state: Mutex<BusState>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, subject: &str) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .subscribers
            .entry(subject.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Make every publish on `subject` fail with `reason`.
    pub fn fail_publishing(&self, subject: &str, reason: impl Into<String>) {
        self.lock()
            .failures
            .insert(subject.to_string(), reason.into());
    }

    /// Every accepted message, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.lock().published.clone()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let mut state = self.lock();
        if let Some(reason) = state.failures.get(subject) {
            return Err(PublishError::Transport {
                subject: subject.to_string(),
                reason: reason.clone(),
            });
        }

        if let Some(subscribers) = state.subscribers.get_mut(subject) {
            subscribers.retain(|tx| tx.send(payload.clone()).is_ok());
        }
        state.published.push(PublishedMessage {
            subject: subject.to_string(),
            payload,
        });
        Ok(())
    }
}
