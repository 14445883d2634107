//! Domain model (tasks, staging families, response documents, errors).

pub mod errors;
pub mod ids;
pub mod response;
pub mod staging;
pub mod state;
pub mod task;

pub use self::errors::{PublishError, StoreError, TranslateError};
pub use self::ids::TaskGuid;
pub use self::response::{
    BuildpackStagingResponse, BuildpackStagingResult, DockerStagingResponse, DockerStagingResult,
    StagingResponse, StagingTaskAnnotation, StartCommands,
};
pub use self::staging::{
    BUILDPACK_TASK_DOMAIN, DOCKER_STAGE_FINISHED_SUBJECT, DOCKER_TASK_DOMAIN,
    STAGE_FINISHED_SUBJECT, STAGE_START_SUBJECT, StagingDomain,
};
pub use self::state::TaskState;
pub use self::task::Task;
