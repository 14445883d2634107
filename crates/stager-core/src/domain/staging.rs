//! Staging task families and the subjects their results are published on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain tag of buildpack based staging tasks.
pub const BUILDPACK_TASK_DOMAIN: &str = "cf-app-staging";

/// Domain tag of docker image staging tasks.
pub const DOCKER_TASK_DOMAIN: &str = "cf-app-docker-staging";

/// Subject the inbound listener consumes staging requests from.
pub const STAGE_START_SUBJECT: &str = "diego.staging.start";

/// Subject buildpack staging responses are published on.
pub const STAGE_FINISHED_SUBJECT: &str = "diego.staging.finished";

/// Subject docker staging responses are published on.
pub const DOCKER_STAGE_FINISHED_SUBJECT: &str = "diego.docker.staging.finished";

/// The task families this outbox owns.
///
/// Anything else in the store belongs to another consumer and is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagingDomain {
    Buildpack,
    Docker,
}

impl StagingDomain {
    /// Recognize a store domain tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            BUILDPACK_TASK_DOMAIN => Some(Self::Buildpack),
            DOCKER_TASK_DOMAIN => Some(Self::Docker),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Buildpack => BUILDPACK_TASK_DOMAIN,
            Self::Docker => DOCKER_TASK_DOMAIN,
        }
    }

    /// Subject the finished-staging response goes out on.
    pub fn finished_subject(self) -> &'static str {
        match self {
            Self::Buildpack => STAGE_FINISHED_SUBJECT,
            Self::Docker => DOCKER_STAGE_FINISHED_SUBJECT,
        }
    }
}

impl fmt::Display for StagingDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
