//! Resolution pipeline: claim -> translate -> publish -> confirm, per task.
//!
//! Each completed task runs through its own pipeline invocation. Pipelines
//! share nothing mutable; exclusivity across instances comes entirely from
//! the claim coordinator.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::metrics::{StagingMetrics, StagingOutcome};
use super::translator::{TranslationInput, decode_annotation, failure_response, translate};
use crate::domain::{PublishError, StagingResponse, Task};
use crate::ports::{ClaimCoordinator, Clock, MessageBus, TaskStore};

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Not a staging task; left for whoever owns its domain.
    Ignored,
    /// Another instance holds the claim.
    ClaimLost,
    /// The annotation could not be decoded, so there is nobody to answer.
    /// The task stays claimed.
    Undeliverable,
    /// The bus refused the response. The task stays claimed.
    PublishFailed,
    /// The response went out but the store refused to resolve the task.
    ResolveFailed { outcome: StagingOutcome },
    /// Response published and task resolved.
    Delivered { outcome: StagingOutcome },
}

pub struct ResolutionPipeline {
    claims: Arc<dyn ClaimCoordinator>,
    store: Arc<dyn TaskStore>,
    bus: Arc<dyn MessageBus>,
    metrics: StagingMetrics,
    clock: Arc<dyn Clock>,
}

impl ResolutionPipeline {
    pub fn new(
        claims: Arc<dyn ClaimCoordinator>,
        store: Arc<dyn TaskStore>,
        bus: Arc<dyn MessageBus>,
        metrics: StagingMetrics,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            store,
            bus,
            metrics,
            clock,
        }
    }

    /// Run one completed task to the end of the protocol.
    pub async fn process(&self, task: Task) -> Resolution {
        let Some(domain) = task.staging_domain() else {
            debug!(task_guid = %task.guid, domain = %task.domain, "task.ignored");
            return Resolution::Ignored;
        };

        if !self.claims.try_claim(&task.guid).await {
            debug!(task_guid = %task.guid, "task.claim.lost");
            return Resolution::ClaimLost;
        }

        let annotation = match decode_annotation(&task.annotation) {
            Ok(annotation) => annotation,
            Err(err) => {
                error!(task_guid = %task.guid, error = %err, "staging.annotation.malformed");
                return Resolution::Undeliverable;
            }
        };

        let response = match translate(TranslationInput::from_task(&task, domain, &annotation)) {
            Ok(response) => response,
            Err(err) => {
                error!(task_guid = %task.guid, error = %err, "staging.result.malformed");
                failure_response(
                    domain,
                    &format!("malformed staging result: {err}"),
                    &annotation.app_id,
                    &annotation.task_id,
                )
            }
        };
        let outcome = if response.is_failure() {
            StagingOutcome::Failed
        } else {
            StagingOutcome::Succeeded
        };

        if let Err(err) = self.publish(&response).await {
            warn!(
                task_guid = %task.guid,
                subject = domain.finished_subject(),
                error = %err,
                "staging.response.publish.failed"
            );
            return Resolution::PublishFailed;
        }

        let resolved = self.store.resolve(&task.guid).await;

        let duration = self.clock.now_unix_nanos().saturating_sub(task.created_at);
        self.metrics.record(outcome, duration);

        match resolved {
            Ok(()) => {
                info!(
                    task_guid = %task.guid,
                    app_id = %annotation.app_id,
                    outcome = ?outcome,
                    duration_nanos = duration,
                    "staging.response.delivered"
                );
                Resolution::Delivered { outcome }
            }
            Err(err) => {
                error!(task_guid = %task.guid, error = %err, "task.resolve.failed");
                Resolution::ResolveFailed { outcome }
            }
        }
    }

    async fn publish(&self, response: &StagingResponse) -> Result<(), PublishError> {
        let payload = response.to_json_bytes()?;
        self.bus
            .publish(response.domain().finished_subject(), payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::metrics::{
        NANOS, STAGING_FAILED_DURATION, STAGING_REQUESTS_FAILED, STAGING_REQUESTS_SUCCEEDED,
        STAGING_SUCCEEDED_DURATION,
    };
    use crate::domain::{
        BUILDPACK_TASK_DOMAIN, DOCKER_STAGE_FINISHED_SUBJECT, DOCKER_TASK_DOMAIN,
        STAGE_FINISHED_SUBJECT, TaskState,
    };
    use crate::impls::{
        InMemoryBus, InMemoryMetricSink, InMemoryTaskStore, Metric, StoreClaimCoordinator,
    };
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::time::Duration;

    const STAGING_DURATION_NANOS: u64 = 900_900;

    struct Fixture {
        store: Arc<InMemoryTaskStore>,
        bus: Arc<InMemoryBus>,
        sink: Arc<InMemoryMetricSink>,
        clock: Arc<FixedClock>,
        pipeline: ResolutionPipeline,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryTaskStore::new());
            let bus = Arc::new(InMemoryBus::new());
            let sink = Arc::new(InMemoryMetricSink::new());
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            ));
            let pipeline = ResolutionPipeline::new(
                Arc::new(StoreClaimCoordinator::new(store.clone())),
                store.clone(),
                bus.clone(),
                StagingMetrics::new(sink.clone()),
                clock.clone(),
            );
            Self {
                store,
                bus,
                sink,
                clock,
                pipeline,
            }
        }

        /// A task created now, completed in the store, with the clock moved
        /// forward by the staging duration.
        fn completed(&self, domain: &str, result: &str) -> Task {
            let task = Task::new("some-task-id", domain, self.clock.now_unix_nanos())
                .with_result(result)
                .with_annotation(r#"{"app_id":"my_app_id","task_id":"do_this"}"#);
            self.clock
                .advance(Duration::from_nanos(STAGING_DURATION_NANOS));
            self.store.complete_task(task.clone());
            task
        }
    }

    fn buildpack_result() -> &'static str {
        r#"{
            "buildpack_key":"buildpack-key",
            "detected_buildpack":"Some Buildpack",
            "execution_metadata":"{\"start_command\":\"./some-start-command\"}",
            "detected_start_command":{"web":"./some-start-command"}
        }"#
    }

    #[tokio::test]
    async fn buildpack_task_is_claimed_published_and_resolved() {
        let fx = Fixture::new();
        let mut published = fx.bus.subscribe(STAGE_FINISHED_SUBJECT);
        let task = fx.completed(BUILDPACK_TASK_DOMAIN, buildpack_result());

        let resolution = fx.pipeline.process(task.clone()).await;

        assert_eq!(
            resolution,
            Resolution::Delivered {
                outcome: StagingOutcome::Succeeded
            }
        );
        assert_eq!(fx.store.claim_call_count(), 1);
        let payload: Value = serde_json::from_slice(&published.try_recv().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "buildpack_key": "buildpack-key",
                "detected_buildpack": "Some Buildpack",
                "execution_metadata": "{\"start_command\":\"./some-start-command\"}",
                "detected_start_command": {"web": "./some-start-command"},
                "app_id": "my_app_id",
                "task_id": "do_this"
            })
        );
        assert_eq!(fx.store.resolve_calls(), vec![task.guid.clone()]);
        assert_eq!(fx.store.state_of(&task.guid), Some(TaskState::Resolved));
    }

    #[tokio::test]
    async fn success_metrics_measure_time_since_creation() {
        let fx = Fixture::new();
        let task = fx.completed(BUILDPACK_TASK_DOMAIN, buildpack_result());

        fx.pipeline.process(task).await;

        assert_eq!(fx.sink.counter(STAGING_REQUESTS_SUCCEEDED), 1);
        assert_eq!(
            fx.sink.value(STAGING_SUCCEEDED_DURATION),
            Some(Metric {
                value: STAGING_DURATION_NANOS as f64,
                unit: NANOS.to_string()
            })
        );
    }

    #[tokio::test]
    async fn docker_task_goes_to_docker_subject() {
        let fx = Fixture::new();
        let mut buildpack = fx.bus.subscribe(STAGE_FINISHED_SUBJECT);
        let mut docker = fx.bus.subscribe(DOCKER_STAGE_FINISHED_SUBJECT);
        let task = fx.completed(
            DOCKER_TASK_DOMAIN,
            r#"{
                "execution_metadata":"{\"cmd\":\"./some-start-command\"}",
                "detected_start_command":{"web":"./some-start-command"}
            }"#,
        );

        fx.pipeline.process(task.clone()).await;

        assert!(buildpack.try_recv().is_err());
        let payload: Value = serde_json::from_slice(&docker.try_recv().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "execution_metadata": "{\"cmd\":\"./some-start-command\"}",
                "detected_start_command": {"web": "./some-start-command"},
                "app_id": "my_app_id",
                "task_id": "do_this"
            })
        );
        assert_eq!(fx.store.resolve_calls(), vec![task.guid]);
    }

    #[tokio::test]
    async fn failed_task_is_reported_and_resolved() {
        let fx = Fixture::new();
        let mut published = fx.bus.subscribe(STAGE_FINISHED_SUBJECT);
        let task = Task::new("some-task-id", BUILDPACK_TASK_DOMAIN, fx.clock.now_unix_nanos())
            .with_annotation(r#"{"app_id":"my_app_id","task_id":"do_this"}"#)
            .failed_with("because i said so");
        fx.clock
            .advance(Duration::from_nanos(STAGING_DURATION_NANOS));
        fx.store.complete_task(task.clone());

        let resolution = fx.pipeline.process(task.clone()).await;

        assert_eq!(
            resolution,
            Resolution::Delivered {
                outcome: StagingOutcome::Failed
            }
        );
        let payload: Value = serde_json::from_slice(&published.try_recv().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "app_id": "my_app_id",
                "buildpack_key": "",
                "detected_buildpack": "",
                "execution_metadata": "",
                "detected_start_command": null,
                "error": "because i said so",
                "task_id": "do_this"
            })
        );
        assert_eq!(fx.store.resolve_calls(), vec![task.guid]);
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_FAILED), 1);
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_SUCCEEDED), 0);
        assert_eq!(
            fx.sink.value(STAGING_FAILED_DURATION).unwrap().value,
            STAGING_DURATION_NANOS as f64
        );
    }

    #[rstest]
    #[case::foreign("some-random-domain")]
    #[case::empty("")]
    #[tokio::test]
    async fn foreign_domains_are_never_claimed(#[case] domain: &str) {
        let fx = Fixture::new();
        let mut published = fx.bus.subscribe(STAGE_FINISHED_SUBJECT);
        let task = fx.completed(domain, buildpack_result());

        assert_eq!(fx.pipeline.process(task).await, Resolution::Ignored);
        assert_eq!(fx.store.claim_call_count(), 0);
        assert!(published.try_recv().is_err());
        assert!(fx.bus.published().is_empty());
    }

    #[rstest]
    #[case::buildpack(BUILDPACK_TASK_DOMAIN, false)]
    #[case::docker(DOCKER_TASK_DOMAIN, false)]
    #[case::failed_buildpack(BUILDPACK_TASK_DOMAIN, true)]
    #[tokio::test]
    async fn lost_claim_publishes_nothing(#[case] domain: &str, #[case] failed: bool) {
        let fx = Fixture::new();
        let mut task = fx.completed(domain, buildpack_result());
        if failed {
            task = task.failed_with("oops");
        }
        fx.store.fail_claims_with("oops");

        assert_eq!(fx.pipeline.process(task).await, Resolution::ClaimLost);
        assert!(fx.bus.published().is_empty());
        assert!(fx.store.resolve_calls().is_empty());
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_SUCCEEDED), 0);
    }

    #[tokio::test]
    async fn already_claimed_task_is_left_alone() {
        let fx = Fixture::new();
        let task = fx.completed(BUILDPACK_TASK_DOMAIN, buildpack_result());

        let first = fx.pipeline.process(task.clone()).await;
        let second = fx.pipeline.process(task).await;

        assert!(matches!(first, Resolution::Delivered { .. }));
        assert_eq!(second, Resolution::ClaimLost);
        assert_eq!(fx.bus.published().len(), 1);
        assert_eq!(fx.store.resolve_calls().len(), 1);
    }

    #[rstest]
    #[case::buildpack(BUILDPACK_TASK_DOMAIN, STAGE_FINISHED_SUBJECT)]
    #[case::docker(DOCKER_TASK_DOMAIN, DOCKER_STAGE_FINISHED_SUBJECT)]
    #[tokio::test]
    async fn publish_failure_leaves_task_claimed(#[case] domain: &str, #[case] subject: &str) {
        let fx = Fixture::new();
        fx.bus.fail_publishing(subject, "kaboom!");
        let task = fx.completed(domain, r#"{"execution_metadata":"{}"}"#);

        assert_eq!(
            fx.pipeline.process(task.clone()).await,
            Resolution::PublishFailed
        );
        assert!(fx.store.resolve_calls().is_empty());
        assert_eq!(fx.store.state_of(&task.guid), Some(TaskState::Resolving));
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_SUCCEEDED), 0);
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_FAILED), 0);
    }

    #[tokio::test]
    async fn malformed_result_is_reported_as_failure() {
        let fx = Fixture::new();
        let mut published = fx.bus.subscribe(STAGE_FINISHED_SUBJECT);
        let task = fx.completed(BUILDPACK_TASK_DOMAIN, "{not json");

        let resolution = fx.pipeline.process(task.clone()).await;

        assert_eq!(
            resolution,
            Resolution::Delivered {
                outcome: StagingOutcome::Failed
            }
        );
        let payload: Value = serde_json::from_slice(&published.try_recv().unwrap()).unwrap();
        assert_eq!(payload["app_id"], "my_app_id");
        assert_eq!(payload["buildpack_key"], "");
        assert!(
            payload["error"]
                .as_str()
                .unwrap()
                .starts_with("malformed staging result")
        );
        assert_eq!(fx.store.resolve_calls(), vec![task.guid]);
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_FAILED), 1);
    }

    #[tokio::test]
    async fn malformed_annotation_is_not_published() {
        let fx = Fixture::new();
        let task = Task::new("some-task-id", BUILDPACK_TASK_DOMAIN, 0)
            .with_result(buildpack_result())
            .with_annotation("garbage");
        fx.store.complete_task(task.clone());

        assert_eq!(
            fx.pipeline.process(task.clone()).await,
            Resolution::Undeliverable
        );
        assert!(fx.bus.published().is_empty());
        assert!(fx.store.resolve_calls().is_empty());
        assert_eq!(fx.store.state_of(&task.guid), Some(TaskState::Resolving));
    }

    #[tokio::test]
    async fn resolve_failure_still_counts_delivery() {
        let fx = Fixture::new();
        let task = fx.completed(BUILDPACK_TASK_DOMAIN, buildpack_result());
        fx.store.fail_resolves_with("store went away");

        let resolution = fx.pipeline.process(task).await;

        assert_eq!(
            resolution,
            Resolution::ResolveFailed {
                outcome: StagingOutcome::Succeeded
            }
        );
        assert_eq!(fx.bus.published().len(), 1);
        assert_eq!(fx.sink.counter(STAGING_REQUESTS_SUCCEEDED), 1);
    }
}
