use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stager_core::domain::{
    BUILDPACK_TASK_DOMAIN, DOCKER_STAGE_FINISHED_SUBJECT, DOCKER_TASK_DOMAIN,
    STAGE_FINISHED_SUBJECT, StagingTaskAnnotation, Task,
};
use stager_core::impls::{InMemoryBus, InMemoryTaskStore, TracingMetricSink};
use stager_core::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};
use stager_core::{OutboxBuilder, OutboxConfig};

/// Run staging outbox instances against an in-memory store and bus.
#[derive(Debug, Parser)]
#[command(name = "stager", version)]
struct Args {
    /// Outbox instances competing for the same tasks.
    #[arg(long, env = "STAGER_INSTANCES", default_value_t = 2)]
    instances: usize,

    /// Demo tasks to complete (cycled through buildpack, docker, failed, foreign).
    #[arg(long, env = "STAGER_DEMO_TASKS", default_value_t = 8)]
    demo_tasks: usize,

    #[arg(long, env = "STAGER_RESUBSCRIBE_INTERVAL_MS", default_value_t = 3_000)]
    resubscribe_interval_ms: u64,

    #[arg(long, env = "STAGER_RESUBSCRIBE_JITTER_MS", default_value_t = 0)]
    resubscribe_jitter_ms: u64,

    #[arg(long, env = "STAGER_MAX_IN_FLIGHT", default_value_t = 64)]
    max_in_flight: usize,

    #[arg(long, env = "STAGER_DRAIN_TIMEOUT_MS", default_value_t = 10_000)]
    drain_timeout_ms: u64,
}

impl Args {
    fn outbox_config(&self) -> OutboxConfig {
        OutboxConfig {
            resubscribe_interval_ms: self.resubscribe_interval_ms,
            resubscribe_jitter_ms: self.resubscribe_jitter_ms,
            max_in_flight: self.max_in_flight,
            drain_timeout_ms: self.drain_timeout_ms,
        }
    }
}

/// Build the n-th demo task. Every fourth task belongs to a foreign domain
/// and is never picked up.
fn demo_task(n: usize, ids: &dyn IdGenerator, created_at: i64) -> anyhow::Result<Task> {
    let annotation = serde_json::to_string(&StagingTaskAnnotation {
        app_id: format!("app-{n}"),
        task_id: format!("staging-{n}"),
    })?;
    let guid = ids.generate_task_guid();

    let task = match n % 4 {
        0 => Task::new(guid, BUILDPACK_TASK_DOMAIN, created_at).with_result(
            serde_json::json!({
                "buildpack_key": "ruby-buildpack",
                "detected_buildpack": "Ruby",
                "execution_metadata": "{\"start_command\":\"bundle exec rackup\"}",
                "detected_start_command": {"web": "bundle exec rackup"}
            })
            .to_string(),
        ),
        1 => Task::new(guid, DOCKER_TASK_DOMAIN, created_at).with_result(
            serde_json::json!({
                "execution_metadata": "{\"cmd\":[\"/start\"]}",
                "detected_start_command": {"web": "/start"}
            })
            .to_string(),
        ),
        2 => Task::new(guid, BUILDPACK_TASK_DOMAIN, created_at)
            .failed_with("no buildpack detected"),
        _ => Task::new(guid, "some-other-domain", created_at),
    };
    Ok(task.with_annotation(annotation))
}

/// Print every response that reaches the bus.
fn print_responses(bus: &InMemoryBus) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for subject in [STAGE_FINISHED_SUBJECT, DOCKER_STAGE_FINISHED_SUBJECT] {
        let mut subscription = bus.subscribe(subject);
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(payload) = subscription.recv().await {
                if tx.send((subject, payload)).is_err() {
                    break;
                }
            }
        });
    }
    tokio::spawn(async move {
        while let Some((subject, payload)) = rx.recv().await {
            println!("{subject}: {}", String::from_utf8_lossy(&payload));
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.outbox_config();
    config.validate().context("invalid outbox configuration")?;

    // (A) in-memory store and bus shared by every instance
    let store = Arc::new(InMemoryTaskStore::new());
    let bus = Arc::new(InMemoryBus::new());
    print_responses(&bus);

    // (B) start the competing outbox instances
    let mut handles = Vec::with_capacity(args.instances);
    for _ in 0..args.instances {
        let outbox = OutboxBuilder::new()
            .store(store.clone())
            .bus(bus.clone())
            .metrics(Arc::new(TracingMetricSink))
            .config(config.clone())
            .build()
            .context("failed to build outbox")?;
        handles.push(outbox.spawn());
    }

    // (C) complete the demo tasks
    let clock = SystemClock;
    let ids = UlidGenerator::new(SystemClock);
    let mut staging_tasks = 0;
    for n in 0..args.demo_tasks {
        let task = demo_task(n, &ids, clock.now_unix_nanos())?;
        if task.staging_domain().is_some() {
            staging_tasks += 1;
        }
        store.complete_task(task);
    }
    info!(total = args.demo_tasks, staging = staging_tasks, "demo tasks completed");

    // (D) wait until every staging task is resolved, or Ctrl-C
    let all_resolved = async {
        while store.counts_by_state().resolved < staging_tasks {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    tokio::select! {
        _ = all_resolved => info!("all staging tasks resolved"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("interrupted");
        }
    }

    // (E) stop every instance and let in-flight pipelines finish
    for handle in handles {
        let report = handle.shutdown_and_join().await?;
        info!(
            completed = report.completed,
            abandoned = report.abandoned,
            "outbox instance stopped"
        );
    }
    println!("final counts: {:?}", store.counts_by_state());
    Ok(())
}
