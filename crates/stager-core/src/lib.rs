//! stager-core
//!
//! Relays the results of completed staging tasks from the task
//! coordination store back to the requester over pub/sub, once per task,
//! even with several outbox instances watching the same store.
//!
//! # Modules
//! - **domain**: tasks, staging domains, response documents, errors
//! - **ports**: traits for the store, claims, bus, metrics, clock, ids
//! - **app**: translator, pipeline, supervisor, outbox process
//! - **impls**: in-memory and tracing implementations of the ports
//! - **config**: outbox tunables

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use app::{Outbox, OutboxBuilder, OutboxHandle};
pub use config::OutboxConfig;
