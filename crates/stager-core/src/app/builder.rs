//! OutboxBuilder - wiring and start-up validation.
//!
//! Missing collaborators and bad configuration are reported by `build()`,
//! before anything subscribes to the store.

use std::sync::Arc;

use super::metrics::StagingMetrics;
use super::outbox::Outbox;
use super::pipeline::ResolutionPipeline;
use super::supervisor::WatchSupervisor;
use crate::config::{ConfigError, OutboxConfig};
use crate::impls::{StoreClaimCoordinator, TracingMetricSink};
use crate::ports::{ClaimCoordinator, Clock, MessageBus, MetricSink, SystemClock, TaskStore};

/// # Example
/// ```ignore
/// let outbox = OutboxBuilder::new()
///     .store(store)
///     .bus(bus)
///     .config(config)
///     .build()?;
/// let handle = outbox.spawn();
/// ```
///
/// Defaults: claims go through the store, metrics go to `tracing`, time
/// comes from the system clock.
pub struct OutboxBuilder {
    store: Option<Arc<dyn TaskStore>>,
    claims: Option<Arc<dyn ClaimCoordinator>>,
    bus: Option<Arc<dyn MessageBus>>,
    metrics: Option<Arc<dyn MetricSink>>,
    clock: Option<Arc<dyn Clock>>,
    config: OutboxConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing {0}: it has no default and must be provided")]
    MissingComponent(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl OutboxBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            claims: None,
            bus: None,
            metrics: None,
            clock: None,
            config: OutboxConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a dedicated claim backend instead of the store's claim call.
    pub fn claims(mut self, claims: Arc<dyn ClaimCoordinator>) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: OutboxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Outbox, BuildError> {
        self.config.validate()?;
        let store = self.store.ok_or(BuildError::MissingComponent("task store"))?;
        let bus = self.bus.ok_or(BuildError::MissingComponent("message bus"))?;

        let claims = self
            .claims
            .unwrap_or_else(|| Arc::new(StoreClaimCoordinator::new(Arc::clone(&store))));
        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(TracingMetricSink));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let pipeline = Arc::new(ResolutionPipeline::new(
            claims,
            Arc::clone(&store),
            bus,
            StagingMetrics::new(metrics),
            Arc::clone(&clock),
        ));
        let supervisor = WatchSupervisor::new(store, clock, self.config.retry_policy());

        Ok(Outbox::new(supervisor, pipeline, self.config))
    }
}

impl Default for OutboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
