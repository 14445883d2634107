//! Domain identifiers.
//!
//! Task guids are assigned by whoever submits the task to the store, so the
//! outbox treats them as opaque strings. Guids minted locally (in-memory
//! store, demo seeding) are ULID based and carry a `task-` prefix, which
//! keeps them sortable by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of a task in the coordination store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskGuid(String);

impl TaskGuid {
    pub const PREFIX: &'static str = "task-";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Ulid> for TaskGuid {
    fn from(ulid: Ulid) -> Self {
        Self(format!("{}{}", Self::PREFIX, ulid))
    }
}

impl From<&str> for TaskGuid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TaskGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
