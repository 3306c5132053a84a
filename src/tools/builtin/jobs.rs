//! Job tools: submit background work and poll its status.

use std::sync::Arc;

use async_trait::async_trait;

use crate::jobs::JobTracker;
use crate::tools::tool::{CallContext, Tool, ToolError, ToolOutput, require_i64, require_str};

/// Submit a background job and return its id without waiting.
pub struct SubmitJobTool {
    tracker: Arc<JobTracker>,
}

impl SubmitJobTool {
    pub fn new(tracker: Arc<JobTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Tool for SubmitJobTool {
    fn name(&self) -> &str {
        "jobs.submit"
    }

    fn description(&self) -> &str {
        "Start a background job that waits durationHint seconds, then completes. Returns the \
         job id immediately; poll jobs.status for progress."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "durationHint": {
                    "type": "integer",
                    "description": "Declared work size in seconds (default bound 0-120)"
                }
            },
            "required": ["durationHint"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let duration_hint = require_i64(&params, "durationHint")?;

        let job_id = self.tracker.submit(duration_hint).await?;
        tracing::debug!(call_id = %ctx.call_id, job_id = %job_id, "Submitted via tool call");

        Ok(ToolOutput::success(
            serde_json::json!({ "jobId": job_id, "status": "queued" }),
            start.elapsed(),
        ))
    }
}

/// Read the current state of a previously submitted job.
pub struct JobStatusTool {
    tracker: Arc<JobTracker>,
}

impl JobStatusTool {
    pub fn new(tracker: Arc<JobTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Tool for JobStatusTool {
    fn name(&self) -> &str {
        "jobs.status"
    }

    fn description(&self) -> &str {
        "Get a job's status (queued, running, completed, failed) with its result or error."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "jobId": {
                    "type": "string",
                    "description": "Id returned by jobs.submit"
                }
            },
            "required": ["jobId"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let job_id = require_str(&params, "jobId")?;

        let job = self.tracker.status(job_id).await?;
        Ok(ToolOutput::success(
            serde_json::json!({
                "jobId": job.job_id,
                "status": job.status,
                "result": job.result,
                "error": job.error,
            }),
            start.elapsed(),
        ))
    }
}
