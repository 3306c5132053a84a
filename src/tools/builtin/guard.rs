//! Guard tools: an open ping and a credential-gated audit write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::guard::AccessGuard;
use crate::tools::tool::{
    CallContext, Tool, ToolError, ToolOutput, empty_parameters, require_str,
};

/// Unauthenticated liveness probe.
pub struct PublicOpTool {
    guard: Arc<AccessGuard>,
}

impl PublicOpTool {
    pub fn new(guard: Arc<AccessGuard>) -> Self {
        Self { guard }
    }
}

#[async_trait]
impl Tool for PublicOpTool {
    fn name(&self) -> &str {
        "guard.publicOp"
    }

    fn description(&self) -> &str {
        "Ping that needs no credential. Returns \"pong\"."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        empty_parameters()
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(
            self.guard.public_op(),
            std::time::Duration::ZERO,
        ))
    }
}

/// Write an audit record; requires the server's shared secret.
pub struct GuardedOpTool {
    guard: Arc<AccessGuard>,
}

impl GuardedOpTool {
    pub fn new(guard: Arc<AccessGuard>) -> Self {
        Self { guard }
    }
}

#[async_trait]
impl Tool for GuardedOpTool {
    fn name(&self) -> &str {
        "guard.guardedOp"
    }

    fn description(&self) -> &str {
        "Append a message to the audit log. Requires the server credential; fails with \
         unauthorized on mismatch and misconfigured when the server has no secret set."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "credential": {
                    "type": "string",
                    "description": "Shared secret configured on the server"
                },
                "message": {
                    "type": "string",
                    "description": "Audit message to record"
                }
            },
            "required": ["credential", "message"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let credential = require_str(&params, "credential")?;
        let message = require_str(&params, "message")?;

        let record = self
            .guard
            .guarded_op(credential, message)
            .await
            .inspect_err(|e| tracing::debug!(call_id = %ctx.call_id, reason = %e, "Denied"))?;
        Ok(ToolOutput::success(
            serde_json::json!({
                "saved": true,
                "sequence": record.sequence,
                "at": record.at,
                "message": record.message,
            }),
            start.elapsed(),
        ))
    }
}
