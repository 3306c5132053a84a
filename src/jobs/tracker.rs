//! Tracker owning every submitted job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::JobsConfig;
use crate::jobs::state::Job;
use crate::tools::ToolError;

/// Errors from job submission and lookup.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("duration hint {value} outside allowed range [{min}, {max}]")]
    InvalidDuration { value: i64, min: u64, max: u64 },

    #[error("job {id} not found")]
    NotFound { id: String },
}

impl From<JobError> for ToolError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InvalidDuration { .. } => ToolError::InvalidArgument(err.to_string()),
            JobError::NotFound { .. } => ToolError::NotFound(err.to_string()),
        }
    }
}

/// Failure reported by a [`JobRunner`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RunnerError(pub String);

/// The work a job performs once it starts running.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, duration_secs: u64) -> Result<String, RunnerError>;
}

/// Default runner: waits out the declared duration.
#[derive(Debug, Default)]
pub struct WaitRunner;

#[async_trait]
impl JobRunner for WaitRunner {
    async fn run(&self, duration_secs: u64) -> Result<String, RunnerError> {
        tokio::time::sleep(Duration::from_secs(duration_secs)).await;
        Ok(format!("Job waited {duration_secs} seconds."))
    }
}

type JobTable = RwLock<HashMap<Uuid, Job>>;

/// Accepts work, runs it in the background and exposes pollable status.
///
/// Finished jobs are never removed, so the table grows for the life of the
/// process. There is also no way to cancel a job once submitted.
pub struct JobTracker {
    config: JobsConfig,
    jobs: Arc<JobTable>,
    runner: Arc<dyn JobRunner>,
}

impl JobTracker {
    pub fn new(config: JobsConfig) -> Self {
        Self::with_runner(config, Arc::new(WaitRunner))
    }

    pub fn with_runner(config: JobsConfig, runner: Arc<dyn JobRunner>) -> Self {
        Self {
            config,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            runner,
        }
    }

    /// Register a job and schedule exactly one execution of it.
    ///
    /// Returns as soon as the job is recorded as `Queued`; the caller polls
    /// [`status`](Self::status) to follow it.
    pub async fn submit(&self, duration_hint: i64) -> Result<Uuid, JobError> {
        if !self.config.accepts(duration_hint) {
            return Err(JobError::InvalidDuration {
                value: duration_hint,
                min: self.config.min_duration_secs,
                max: self.config.max_duration_secs,
            });
        }

        let job = Job::new(duration_hint as u64);
        let job_id = job.job_id;
        self.jobs.write().await.insert(job_id, job);

        tracing::info!(job_id = %job_id, duration_secs = duration_hint, "Job submitted");
        spawn_execution(
            job_id,
            duration_hint as u64,
            Arc::clone(&self.jobs),
            Arc::clone(&self.runner),
        );

        Ok(job_id)
    }

    /// Current snapshot of a job.
    pub async fn status(&self, job_id: &str) -> Result<Job, JobError> {
        let not_found = || JobError::NotFound {
            id: job_id.to_string(),
        };
        // A malformed id can never have been issued.
        let id = Uuid::parse_str(job_id).map_err(|_| not_found())?;
        self.jobs.read().await.get(&id).cloned().ok_or_else(not_found)
    }

    /// Number of jobs ever submitted.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Spawn the detached task that drives one job to a terminal state.
///
/// Nobody joins the task; its outcome is observed only through the job
/// table.
///
/// The runner executes in its own task so a panic inside it is observed
/// as a join error and recorded as `Failed` instead of stranding the job
/// in `Running`.
fn spawn_execution(
    job_id: Uuid,
    duration_secs: u64,
    jobs: Arc<JobTable>,
    runner: Arc<dyn JobRunner>,
) {
    tokio::spawn(async move {
        replace(&jobs, job_id, Job::started).await;
        tracing::debug!(job_id = %job_id, "Job running");

        let work = tokio::spawn(async move { runner.run(duration_secs).await });

        match work.await {
            Ok(Ok(result)) => {
                replace(&jobs, job_id, |job| job.completed(result)).await;
                tracing::info!(job_id = %job_id, "Job completed");
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id = %job_id, error = %e, "Job failed");
                replace(&jobs, job_id, |job| job.failed(e.to_string())).await;
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Job task aborted");
                replace(&jobs, job_id, |job| job.failed(format!("job aborted: {e}"))).await;
            }
        }
    });
}

/// Swap a job's record for its successor under the write lock.
async fn replace<F>(jobs: &JobTable, job_id: Uuid, next: F)
where
    F: FnOnce(&Job) -> Result<Job, String>,
{
    let mut jobs = jobs.write().await;
    let Some(current) = jobs.get(&job_id) else {
        tracing::warn!(job_id = %job_id, "Transition for unknown job");
        return;
    };
    match next(current) {
        Ok(successor) => {
            jobs.insert(job_id, successor);
        }
        Err(e) => tracing::warn!(job_id = %job_id, error = %e, "Rejected job transition"),
    }
}
