//! Payload translator: completed task -> requester-facing response.
//!
//! Pure functions only. The resolution pipeline decides what to do with a
//! translation error.

use crate::domain::{
    BuildpackStagingResponse, BuildpackStagingResult, DockerStagingResponse, DockerStagingResult,
    StagingDomain, StagingResponse, StagingTaskAnnotation, Task, TranslateError,
};

/// Everything the translator looks at, borrowed from a task.
#[derive(Debug, Clone, Copy)]
pub struct TranslationInput<'a> {
    pub domain: StagingDomain,
    pub result: &'a str,
    pub failed: bool,
    pub failure_reason: &'a str,
    pub app_id: &'a str,
    pub task_id: &'a str,
}

impl<'a> TranslationInput<'a> {
    pub fn from_task(
        task: &'a Task,
        domain: StagingDomain,
        annotation: &'a StagingTaskAnnotation,
    ) -> Self {
        Self {
            domain,
            result: &task.result,
            failed: task.failed,
            failure_reason: &task.failure_reason,
            app_id: &annotation.app_id,
            task_id: &annotation.task_id,
        }
    }
}

/// Decode the requester identifiers stored on a task.
pub fn decode_annotation(annotation: &str) -> Result<StagingTaskAnnotation, TranslateError> {
    serde_json::from_str(annotation).map_err(TranslateError::MalformedAnnotation)
}

/// Build the response for a task.
///
/// A failed task never has its result parsed; the response carries the
/// failure reason and empty result fields.
pub fn translate(input: TranslationInput<'_>) -> Result<StagingResponse, TranslateError> {
    if input.failed {
        return Ok(failure_response(
            input.domain,
            input.failure_reason,
            input.app_id,
            input.task_id,
        ));
    }

    let malformed = |source| TranslateError::MalformedResult {
        domain: input.domain,
        source,
    };

    let response = match input.domain {
        StagingDomain::Buildpack => {
            let result: BuildpackStagingResult =
                serde_json::from_str(input.result).map_err(malformed)?;
            StagingResponse::Buildpack(BuildpackStagingResponse {
                result,
                app_id: input.app_id.to_string(),
                task_id: input.task_id.to_string(),
                error: None,
            })
        }
        StagingDomain::Docker => {
            let result: DockerStagingResult =
                serde_json::from_str(input.result).map_err(malformed)?;
            StagingResponse::Docker(DockerStagingResponse {
                result,
                app_id: input.app_id.to_string(),
                task_id: input.task_id.to_string(),
                error: None,
            })
        }
    };
    Ok(response)
}

/// Response reporting `error` with every result field at its empty value.
pub fn failure_response(
    domain: StagingDomain,
    error: &str,
    app_id: &str,
    task_id: &str,
) -> StagingResponse {
    match domain {
        StagingDomain::Buildpack => StagingResponse::Buildpack(BuildpackStagingResponse {
            result: BuildpackStagingResult::default(),
            app_id: app_id.to_string(),
            task_id: task_id.to_string(),
            error: Some(error.to_string()),
        }),
        StagingDomain::Docker => StagingResponse::Docker(DockerStagingResponse {
            result: DockerStagingResult::default(),
            app_id: app_id.to_string(),
            task_id: task_id.to_string(),
            error: Some(error.to_string()),
        }),
    }
}
