//! Limiter tools: per-client admission and the active limits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::tools::rate_limiter::{RateLimitError, WindowLimiter};
use crate::tools::tool::{
    CallContext, Tool, ToolError, ToolOutput, empty_parameters, require_str,
};

/// Admit a call for a client identity, echoing an optional message back.
pub struct AdmitTool {
    limiter: Arc<WindowLimiter>,
}

impl AdmitTool {
    pub fn new(limiter: Arc<WindowLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl Tool for AdmitTool {
    fn name(&self) -> &str {
        "limiter.admit"
    }

    fn description(&self) -> &str {
        "Record a call for a client if it is under its limit for the trailing window. \
         Fails with rate_limit_exceeded otherwise; retry once older calls age out."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "clientId": {
                    "type": "string",
                    "description": "Identity the limit applies to"
                },
                "message": {
                    "type": "string",
                    "description": "Optional payload echoed back on admission"
                }
            },
            "required": ["clientId"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let client_id = require_str(&params, "clientId")?;

        let admitted: Result<(), RateLimitError> = self.limiter.admit(client_id).await.into();
        admitted?;

        let mut result = serde_json::json!({
            "clientId": client_id,
            "accepted": true,
        });
        if let Some(message) = params.get("message").and_then(|v| v.as_str()) {
            result["message"] = serde_json::Value::String(message.to_string());
        }

        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

/// Report the configured window and admission cap.
pub struct LimiterConfigTool {
    limiter: Arc<WindowLimiter>,
}

impl LimiterConfigTool {
    pub fn new(limiter: Arc<WindowLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl Tool for LimiterConfigTool {
    fn name(&self) -> &str {
        "limiter.config"
    }

    fn description(&self) -> &str {
        "Show the rate limit window in seconds and the maximum calls per window."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        empty_parameters()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let config = self.limiter.config();
        Ok(ToolOutput::success(
            serde_json::json!({
                "windowSeconds": config.window.as_secs(),
                "maxRequests": config.max_requests,
            }),
            std::time::Duration::ZERO,
        ))
    }
}
