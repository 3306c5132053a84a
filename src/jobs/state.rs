//! Job state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, execution not started yet.
    Queued,
    /// Execution has begun.
    Running,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        use JobStatus::*;

        matches!(
            (self, target),
            (Queued, Running) | (Running, Completed) | (Running, Failed)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of a job. The tracker replaces the whole record on every
/// transition, so readers never see a half-applied update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    /// Declared work size in seconds.
    pub duration_secs: u64,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            status: JobStatus::Queued,
            result: None,
            error: None,
            duration_secs,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Produce the `Running` successor of this snapshot.
    pub fn started(&self) -> Result<Self, String> {
        self.check(JobStatus::Running)?;
        Ok(Self {
            status: JobStatus::Running,
            started_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    /// Produce the `Completed` successor of this snapshot.
    pub fn completed(&self, result: impl Into<String>) -> Result<Self, String> {
        self.check(JobStatus::Completed)?;
        Ok(Self {
            status: JobStatus::Completed,
            result: Some(result.into()),
            finished_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    /// Produce the `Failed` successor of this snapshot.
    pub fn failed(&self, error: impl Into<String>) -> Result<Self, String> {
        self.check(JobStatus::Failed)?;
        Ok(Self {
            status: JobStatus::Failed,
            error: Some(error.into()),
            finished_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    fn check(&self, target: JobStatus) -> Result<(), String> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(format!(
                "Cannot transition from {} to {}",
                self.status, target
            ))
        }
    }
}
