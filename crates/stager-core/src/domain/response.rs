//! Documents exchanged with the requester.
//!
//! The inbound listener publishes error responses with the same schema, so
//! every field name here is part of the wire contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StagingDomain;

/// Process type -> start command, as detected by the stager.
pub type StartCommands = BTreeMap<String, String>;

/// Requester identifiers stored on the task at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingTaskAnnotation {
    pub app_id: String,
    pub task_id: String,
}

/// Result document of a buildpack staging task.
///
/// Missing fields decode to their empty value; wrong types are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackStagingResult {
    pub buildpack_key: String,
    pub detected_buildpack: String,
    pub execution_metadata: String,
    pub detected_start_command: Option<StartCommands>,
}

/// Result document of a docker staging task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerStagingResult {
    pub execution_metadata: String,
    pub detected_start_command: Option<StartCommands>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackStagingResponse {
    #[serde(flatten)]
    pub result: BuildpackStagingResult,
    pub app_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerStagingResponse {
    #[serde(flatten)]
    pub result: DockerStagingResult,
    pub app_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The message published back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StagingResponse {
    Buildpack(BuildpackStagingResponse),
    Docker(DockerStagingResponse),
}

impl StagingResponse {
    pub fn domain(&self) -> StagingDomain {
        match self {
            Self::Buildpack(_) => StagingDomain::Buildpack,
            Self::Docker(_) => StagingDomain::Docker,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Buildpack(r) => r.error.as_deref(),
            Self::Docker(r) => r.error.as_deref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
