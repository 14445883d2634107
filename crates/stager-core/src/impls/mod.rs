//! Impls - in-memory and tracing implementations of the ports.
//!
//! Production deployments plug their own store and bus clients in behind
//! the same traits; these implementations back the CLI demo and the tests.

pub mod claims;
pub mod inmem_bus;
pub mod inmem_store;
pub mod metrics;
mod record;

pub use self::claims::StoreClaimCoordinator;
pub use self::inmem_bus::{InMemoryBus, PublishedMessage};
pub use self::inmem_store::InMemoryTaskStore;
pub use self::metrics::{InMemoryMetricSink, Metric, TracingMetricSink};
pub use self::record::TaskRecord;
