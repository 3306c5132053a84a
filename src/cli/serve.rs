//! Newline-delimited JSON transport for tool calls.
//!
//! One request per input line, one response per output line. Each request
//! runs on its own task; responses are written in completion order and
//! matched to requests by `id`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::tools::{CallContext, ToolError, ToolOutput, ToolRegistry};

/// An incoming call.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub tool: String,
    #[serde(default = "empty_object")]
    pub arguments: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl From<&ToolError> for ErrorBody {
    fn from(err: &ToolError) -> Self {
        let retry_after_ms = match err {
            ToolError::RateLimitExceeded { retry_after } => Some(retry_after.as_millis() as u64),
            _ => None,
        };
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retry_after_ms,
        }
    }
}

/// One response line.
#[derive(Debug, Clone, Serialize)]
pub struct CallResponse {
    pub id: Option<serde_json::Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl CallResponse {
    pub fn from_result(
        id: Option<serde_json::Value>,
        result: Result<ToolOutput, ToolError>,
    ) -> Self {
        match result {
            Ok(output) => Self {
                id,
                ok: true,
                result: Some(output.result),
                error: None,
            },
            Err(e) => Self {
                id,
                ok: false,
                result: None,
                error: Some(ErrorBody::from(&e)),
            },
        }
    }

    pub fn invalid(id: Option<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::from_result(id, Err(ToolError::InvalidArgument(message.into())))
    }

    /// Serialize to a single JSON line without the trailing newline.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"id":null,"ok":false,"error":{{"kind":"internal","message":"unserializable response: {e}"}}}}"#
            )
        })
    }
}

/// Parse and dispatch one request line.
pub async fn handle_line(registry: &ToolRegistry, line: &str) -> CallResponse {
    let request: CallRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            // Salvage the id so the caller can still correlate the failure.
            let id = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| v.get("id").cloned());
            return CallResponse::invalid(id, format!("malformed request: {e}"));
        }
    };

    let mut ctx = CallContext::new();
    if let Some(id) = &request.id {
        ctx = ctx.with_request_id(id.to_string());
    }
    tracing::debug!(call_id = %ctx.call_id, tool = %request.tool, "Dispatching");

    let result = registry.execute(&request.tool, request.arguments, &ctx).await;
    CallResponse::from_result(request.id, result)
}

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// A line that is not valid UTF-8 is answered with `invalid_argument` like
/// any other malformed request. Only a read or write failure ends the loop,
/// and even then every in-flight request is answered first.
pub async fn serve<R, W>(
    registry: Arc<ToolRegistry>,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut buf = Vec::new();
    let mut served = 0u64;
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                served += 1;
                let response =
                    CallResponse::invalid(None, format!("request is not valid UTF-8: {e}"));
                if tx.send(response.to_line()).await.is_err() {
                    tracing::warn!("Response writer closed; dropping response");
                }
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        served += 1;
        let line = line.to_string();
        let registry = Arc::clone(&registry);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&registry, &line).await;
            if tx.send(response.to_line()).await.is_err() {
                tracing::warn!("Response writer closed; dropping response");
            }
        });
    };
    drop(tx);

    match &read_result {
        Ok(()) => tracing::info!(requests = served, "Input closed, draining responses"),
        Err(e) => {
            tracing::error!(requests = served, error = %e, "Read failed, draining responses")
        }
    }

    let write_result = match writer_task.await {
        Ok(result) => result,
        Err(e) => Err(std::io::Error::other(format!("writer task failed: {e}"))),
    };
    read_result.and(write_result)
}
