//! Tool registry: name lookup, dispatch and call accounting.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::toolbox::Toolbox;
use crate::tools::builtin::{
    AdmitTool, CancelOrderTool, CheckAvailabilityTool, ComputeOrFetchTool, CreateOrderTool,
    GetOrderTool, GuardedOpTool, HealthTool, JobStatusTool, LimiterConfigTool, MemoStatsTool,
    MetricsTool, PublicOpTool, SubmitJobTool,
};
use crate::tools::tool::{CallContext, Tool, ToolError, ToolOutput, ToolSchema};

/// Process-wide call counters.
#[derive(Debug)]
pub struct CallMetrics {
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    started_at: DateTime<Utc>,
    started: tokio::time::Instant,
}

/// Point-in-time copy of [`CallMetrics`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub errors_total: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
}

impl CallMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            started_at: Utc::now(),
            started: tokio::time::Instant::now(),
        }
    }

    fn observe(&self, success: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }
}

impl Default for CallMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    metrics: Arc<CallMetrics>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            metrics: Arc::new(CallMetrics::new()),
        }
    }

    /// Create a registry with every state tool backed by `toolbox`.
    pub async fn with_toolbox(toolbox: &Toolbox) -> Self {
        let registry = Self::new();
        registry.register_state_tools(toolbox).await;
        registry.register_server_tools().await;
        registry
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.write().await.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced previously registered tool");
        } else {
            tracing::debug!(tool = %name, "Registered tool");
        }
    }

    /// Register the memo, limiter, job, guard and ledger tools.
    pub async fn register_state_tools(&self, toolbox: &Toolbox) {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ComputeOrFetchTool::new(Arc::clone(&toolbox.memo))),
            Arc::new(MemoStatsTool::new(Arc::clone(&toolbox.memo))),
            Arc::new(AdmitTool::new(Arc::clone(&toolbox.limiter))),
            Arc::new(LimiterConfigTool::new(Arc::clone(&toolbox.limiter))),
            Arc::new(SubmitJobTool::new(Arc::clone(&toolbox.jobs))),
            Arc::new(JobStatusTool::new(Arc::clone(&toolbox.jobs))),
            Arc::new(PublicOpTool::new(Arc::clone(&toolbox.guard))),
            Arc::new(GuardedOpTool::new(Arc::clone(&toolbox.guard))),
            Arc::new(CheckAvailabilityTool::new(Arc::clone(&toolbox.ledger))),
            Arc::new(CreateOrderTool::new(Arc::clone(&toolbox.ledger))),
            Arc::new(CancelOrderTool::new(Arc::clone(&toolbox.ledger))),
            Arc::new(GetOrderTool::new(Arc::clone(&toolbox.ledger))),
        ];
        for tool in tools {
            self.register(tool).await;
        }
    }

    /// Register `server.health` and `server.metrics`.
    pub async fn register_server_tools(&self) {
        self.register(Arc::new(HealthTool::new(Arc::clone(&self.metrics))))
            .await;
        self.register(Arc::new(MetricsTool::new(Arc::clone(&self.metrics))))
            .await;
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// List registered tool names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered tools.
    pub async fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.read().await.values().cloned().collect()
    }

    /// Schemas for every tool, sorted by name.
    pub async fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.all().await.iter().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn metrics(&self) -> &CallMetrics {
        &self.metrics
    }

    /// Dispatch a call by tool name. Unknown names fail with `NotFound`.
    ///
    /// The registry lock is released before the tool runs, so calls to
    /// different tools proceed concurrently.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let result = match self.get(name).await {
            Some(tool) => tool.execute(params, ctx).await,
            None => Err(ToolError::NotFound(format!("unknown tool '{name}'"))),
        };
        self.metrics.observe(result.is_ok());

        match &result {
            Ok(output) => tracing::debug!(
                call_id = %ctx.call_id,
                tool = %name,
                elapsed_ms = output.duration.as_millis() as u64,
                "Tool call succeeded"
            ),
            Err(e) => tracing::info!(
                call_id = %ctx.call_id,
                tool = %name,
                kind = e.kind(),
                error = %e,
                "Tool call rejected"
            ),
        }
        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
