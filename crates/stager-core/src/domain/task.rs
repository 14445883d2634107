use serde::{Deserialize, Serialize};

use super::{StagingDomain, TaskGuid};

/// A completed task as reported by the coordination store.
///
/// The outbox only ever sees tasks once they are completed, and never
/// mutates them locally: claims and resolutions happen in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub guid: TaskGuid,
    pub domain: String,

    /// Result document written by the worker (JSON, domain specific).
    #[serde(default)]
    pub result: String,

    /// Requester identifiers set at submission (JSON `StagingTaskAnnotation`).
    #[serde(default)]
    pub annotation: String,

    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub failure_reason: String,

    /// Wall-clock creation time, Unix nanoseconds.
    pub created_at: i64,
}

impl Task {
    pub fn new(guid: impl Into<TaskGuid>, domain: impl Into<String>, created_at: i64) -> Self {
        Self {
            guid: guid.into(),
            domain: domain.into(),
            result: String::new(),
            annotation: String::new(),
            failed: false,
            failure_reason: String::new(),
            created_at,
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Mark the task as failed by its worker.
    pub fn failed_with(mut self, reason: impl Into<String>) -> Self {
        self.failed = true;
        self.failure_reason = reason.into();
        self
    }

    /// The staging family this task belongs to, if any.
    pub fn staging_domain(&self) -> Option<StagingDomain> {
        StagingDomain::from_tag(&self.domain)
    }
}
