//! App - the outbox itself, built on top of the ports.
//!
//! # Components
//! - **translator**: task result -> response document (pure)
//! - **metrics**: staging outcome counters and latency samples
//! - **pipeline**: claim -> translate -> publish -> confirm for one task
//! - **dispatcher**: bounded, non-blocking hand-off to pipelines
//! - **supervisor**: watch/retry loop over the completed-task feed
//! - **outbox**: process lifecycle (start, shutdown, drain)
//! - **builder**: wiring and start-up validation

pub mod builder;
pub mod dispatcher;
pub mod metrics;
pub mod outbox;
pub mod pipeline;
pub mod retry;
pub mod supervisor;
pub mod translator;

pub use self::builder::{BuildError, OutboxBuilder};
pub use self::dispatcher::{Dispatcher, DrainReport};
pub use self::metrics::{StagingMetrics, StagingOutcome};
pub use self::outbox::{Outbox, OutboxHandle};
pub use self::pipeline::{Resolution, ResolutionPipeline};
pub use self::retry::RetryPolicy;
pub use self::supervisor::WatchSupervisor;
pub use self::translator::{TranslationInput, translate};
