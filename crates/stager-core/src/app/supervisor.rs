//! WatchSupervisor - keeps a subscription to the completed-task feed alive.
//!
//! # Flow
//! 1. `TaskStore::watch_completed_tasks()` opens the feed
//! 2. every task goes to the dispatcher, which returns immediately
//! 3. on a feed error, wait `RetryPolicy::next_delay` and subscribe again
//! 4. on shutdown, stop the store-side subscription and return

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dispatcher::Dispatcher;
use super::retry::RetryPolicy;
use crate::domain::{StoreError, Task};
use crate::ports::{Clock, TaskStore};

enum FeedEvent {
    Task(Task),
    Error(Option<StoreError>),
    Closed,
    Shutdown,
}

pub struct WatchSupervisor {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl WatchSupervisor {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, retry: RetryPolicy) -> Self {
        Self {
            store,
            clock,
            retry,
        }
    }

    /// Watch until `shutdown` turns true (or its sender goes away).
    pub async fn run(&self, dispatcher: &mut Dispatcher, shutdown: &mut watch::Receiver<bool>) {
        let mut consecutive_failures = 0u32;

        loop {
            if *shutdown.borrow() {
                return;
            }

            let mut watch = self.store.watch_completed_tasks().await;
            debug!("watching for completed tasks");
            let mut errors_open = true;

            let failure = loop {
                let event = tokio::select! {
                    _ = shutdown_requested(shutdown) => FeedEvent::Shutdown,
                    task = watch.tasks.recv() => match task {
                        Some(task) => FeedEvent::Task(task),
                        None => FeedEvent::Closed,
                    },
                    err = watch.errors.recv(), if errors_open => FeedEvent::Error(err),
                };

                match event {
                    FeedEvent::Task(task) => {
                        consecutive_failures = 0;
                        dispatcher.dispatch(task);
                    }
                    FeedEvent::Error(Some(err)) => break err.to_string(),
                    FeedEvent::Error(None) => errors_open = false,
                    FeedEvent::Closed => break "feed closed".to_string(),
                    FeedEvent::Shutdown => {
                        watch.stop();
                        info!("stopped watching for completed tasks");
                        return;
                    }
                }
            };
            watch.stop();

            consecutive_failures = consecutive_failures.saturating_add(1);
            let delay = self.retry.next_delay(consecutive_failures);
            warn!(
                error = %failure,
                attempt = consecutive_failures,
                retry_in_ms = delay.as_millis() as u64,
                "watch for completed tasks failed"
            );

            tokio::select! {
                _ = shutdown_requested(shutdown) => return,
                _ = self.clock.sleep(delay) => {}
            }
        }
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // a dropped sender counts as a shutdown request
    let _ = shutdown.wait_for(|stop| *stop).await;
}
