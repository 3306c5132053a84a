//! Server tools: liveness and call counters.

use std::sync::Arc;

use async_trait::async_trait;

use crate::tools::registry::CallMetrics;
use crate::tools::tool::{CallContext, Tool, ToolError, ToolOutput, empty_parameters};

/// Report that the server is up and for how long.
pub struct HealthTool {
    metrics: Arc<CallMetrics>,
}

impl HealthTool {
    pub fn new(metrics: Arc<CallMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Tool for HealthTool {
    fn name(&self) -> &str {
        "server.health"
    }

    fn description(&self) -> &str {
        "Health check. Returns status ok and uptime in seconds."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        empty_parameters()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let snapshot = self.metrics.snapshot();
        Ok(ToolOutput::success(
            serde_json::json!({
                "status": "ok",
                "uptimeSeconds": snapshot.uptime_seconds,
            }),
            std::time::Duration::ZERO,
        ))
    }
}

/// Report total and failed call counts since startup.
pub struct MetricsTool {
    metrics: Arc<CallMetrics>,
}

impl MetricsTool {
    pub fn new(metrics: Arc<CallMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Tool for MetricsTool {
    fn name(&self) -> &str {
        "server.metrics"
    }

    fn description(&self) -> &str {
        "Call counters since startup: requestsTotal, errorsTotal and startedAt."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        empty_parameters()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        ToolOutput::json(&self.metrics.snapshot(), std::time::Duration::ZERO)
    }
}
