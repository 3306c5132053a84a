//! Memo tools: memoized text summary and table statistics.

use std::sync::Arc;

use async_trait::async_trait;

use crate::tools::memo::{ExpiringMemo, TextSummary, summarize};
use crate::tools::tool::{
    CallContext, Tool, ToolError, ToolOutput, empty_parameters, require_str,
};

/// Summarize text, reusing the result for identical input within the TTL.
pub struct ComputeOrFetchTool {
    memo: Arc<ExpiringMemo<TextSummary>>,
}

impl ComputeOrFetchTool {
    pub fn new(memo: Arc<ExpiringMemo<TextSummary>>) -> Self {
        Self { memo }
    }
}

#[async_trait]
impl Tool for ComputeOrFetchTool {
    fn name(&self) -> &str {
        "memo.computeOrFetch"
    }

    fn description(&self) -> &str {
        "Summarize a block of text (word count, first and last ten words). Identical input \
         within the cache TTL is served from cache with cached=true."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Text to summarize"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let input = require_str(&params, "input")?;

        let lookup = self.memo.compute_or_fetch(input, summarize).await;
        ToolOutput::json(&lookup, start.elapsed())
    }
}

/// Report how many memo entries exist and how many are still valid.
pub struct MemoStatsTool {
    memo: Arc<ExpiringMemo<TextSummary>>,
}

impl MemoStatsTool {
    pub fn new(memo: Arc<ExpiringMemo<TextSummary>>) -> Self {
        Self { memo }
    }
}

#[async_trait]
impl Tool for MemoStatsTool {
    fn name(&self) -> &str {
        "memo.stats"
    }

    fn description(&self) -> &str {
        "Count memo entries: total stored, alive (unexpired right now), and the TTL in seconds."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        empty_parameters()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let stats = self.memo.stats().await;

        Ok(ToolOutput::success(
            serde_json::json!({
                "total": stats.total,
                "alive": stats.alive,
                "ttl": stats.ttl.as_secs(),
            }),
            start.elapsed(),
        ))
    }
}
