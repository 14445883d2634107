//! Ports - the outbox's view of the outside world.
//!
//! Each trait stands in for an external system (coordination store, pub/sub
//! transport, metrics backend) so the application layer never touches a
//! concrete client API.

pub mod bus;
pub mod claim;
pub mod clock;
pub mod id_generator;
pub mod metrics;
pub mod task_store;

pub use self::bus::MessageBus;
pub use self::claim::ClaimCoordinator;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::metrics::MetricSink;
pub use self::task_store::{TaskStore, TaskWatch};
