//! Tool trait and types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Per-call metadata handed to every tool invocation.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Unique id for this call, used to correlate log lines.
    pub call_id: Uuid,
    /// Caller-supplied request id, if the transport carried one.
    pub request_id: Option<String>,
    /// When the call arrived.
    pub received_at: DateTime<Utc>,
}

impl CallContext {
    pub fn new() -> Self {
        Self {
            call_id: Uuid::new_v4(),
            request_id: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure kinds a tool call can surface to its caller.
///
/// Every rejected call leaves the owning component's state unchanged.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },

    #[error("Insufficient stock for '{sku}': requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: u64,
        available: u64,
    },

    /// A fault on the server side; the caller's input was not the problem.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Stable wire name for this failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Misconfigured(_) => "misconfigured",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the same call may succeed later without the caller changing it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result data.
    pub result: serde_json::Value,
    /// Time taken.
    pub duration: Duration,
}

impl ToolOutput {
    /// Create a successful output with a JSON result.
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }

    /// Create a text output.
    pub fn text(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            result: serde_json::Value::String(text.into()),
            duration,
        }
    }

    /// Serialize `value` into a successful output.
    pub fn json<T: Serialize>(value: &T, duration: Duration) -> Result<Self, ToolError> {
        let result = serde_json::to_value(value)
            .map_err(|e| ToolError::Internal(format!("unserializable result: {e}")))?;
        Ok(Self::success(result, duration))
    }
}

/// Definition of a tool's parameters using JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Trait for tools exposed to the calling agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get a description of what the tool does.
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError>;

    /// Get the tool schema for function calling.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Extract a required string parameter from a JSON object.
///
/// Returns `ToolError::InvalidArgument` if the key is missing or not a string.
pub fn require_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArgument(format!("missing '{}' parameter", name)))
}

/// Extract a required integer parameter from a JSON object.
///
/// Floats and numeric strings are rejected rather than coerced.
pub fn require_i64(params: &serde_json::Value, name: &str) -> Result<i64, ToolError> {
    let value = require_param(params, name)?;
    value.as_i64().ok_or_else(|| {
        ToolError::InvalidArgument(format!("'{}' must be an integer, got {}", name, value))
    })
}

/// Extract a required parameter of any type from a JSON object.
///
/// Returns `ToolError::InvalidArgument` if the key is missing.
pub fn require_param<'a>(
    params: &'a serde_json::Value,
    name: &str,
) -> Result<&'a serde_json::Value, ToolError> {
    params
        .get(name)
        .ok_or_else(|| ToolError::InvalidArgument(format!("missing '{}' parameter", name)))
}

/// Lenient runtime validation of a tool's `parameters_schema()`.
///
/// Returns a list of validation errors. An empty list means the schema is valid.
///
/// # Rules enforced
///
/// 1. Top-level must have `"type": "object"`
/// 2. Top-level must have `"properties"` as an object
/// 3. Every key in `"required"` must exist in `"properties"`
/// 4. Nested objects follow the same rules recursively
/// 5. Array properties should have `"items"` defined
pub fn validate_tool_schema(schema: &serde_json::Value, path: &str) -> Vec<String> {
    let mut errors = Vec::new();

    match schema.get("type").and_then(|t| t.as_str()) {
        Some("object") => {}
        Some(other) => {
            errors.push(format!("{path}: expected type \"object\", got \"{other}\""));
            return errors;
        }
        None => {
            errors.push(format!("{path}: missing \"type\": \"object\""));
            return errors;
        }
    }

    let properties = match schema.get("properties").and_then(|p| p.as_object()) {
        Some(p) => p,
        None => {
            errors.push(format!("{path}: missing or non-object \"properties\""));
            return errors;
        }
    };

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for req in required {
            if let Some(key) = req.as_str()
                && !properties.contains_key(key)
            {
                errors.push(format!(
                    "{path}: required key \"{key}\" not found in properties"
                ));
            }
        }
    }

    for (key, prop) in properties {
        let prop_path = format!("{path}.{key}");
        match prop.get("type").and_then(|t| t.as_str()) {
            Some("object") => errors.extend(validate_tool_schema(prop, &prop_path)),
            Some("array") => match prop.get("items") {
                Some(items) if items.get("type").and_then(|t| t.as_str()) == Some("object") => {
                    errors.extend(validate_tool_schema(items, &format!("{prop_path}.items")));
                }
                Some(_) => {}
                None => errors.push(format!("{prop_path}: array property missing \"items\"")),
            },
            _ => {}
        }
    }

    errors
}

/// Schema for tools that take no arguments.
pub fn empty_parameters() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple no-op tool for testing.
    #[derive(Debug)]
    pub struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input message. Useful for testing."
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The message to echo back"
                    }
                },
                "required": ["message"]
            })
        }

        async fn execute(
            &self,
            params: serde_json::Value,
            _ctx: &CallContext,
        ) -> Result<ToolOutput, ToolError> {
            let message = require_str(&params, "message")?;
            Ok(ToolOutput::text(message, Duration::from_millis(1)))
        }
    }

    #[tokio::test]
    async fn test_echo_tool() {
        let tool = EchoTool;
        let ctx = CallContext::default();

        let result = tool
            .execute(serde_json::json!({"message": "hello"}), &ctx)
            .await
            .unwrap();

        assert_eq!(result.result, serde_json::json!("hello"));
    }

    #[test]
    fn test_tool_schema() {
        let schema = EchoTool.schema();
        assert_eq!(schema.name, "echo");
        assert!(!schema.description.is_empty());
    }

    #[test]
    fn test_require_str_wrong_type() {
        let params = serde_json::json!({"name": 42});
        let err = require_str(&params, "name").unwrap_err();
        assert!(err.to_string().contains("missing 'name'"));
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_require_i64() {
        let params = serde_json::json!({"n": 7, "f": 1.5, "s": "3"});
        assert_eq!(require_i64(&params, "n").unwrap(), 7);
        assert!(require_i64(&params, "f").unwrap_err().to_string().contains("integer"));
        assert!(require_i64(&params, "s").is_err());
        assert!(
            require_i64(&params, "missing")
                .unwrap_err()
                .to_string()
                .contains("missing 'missing'")
        );
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let errors = [
            ToolError::InvalidArgument(String::new()),
            ToolError::NotFound(String::new()),
            ToolError::Unauthorized(String::new()),
            ToolError::Misconfigured(String::new()),
            ToolError::RateLimitExceeded {
                retry_after: Duration::ZERO,
            },
            ToolError::InsufficientStock {
                sku: "A".into(),
                requested: 1,
                available: 0,
            },
            ToolError::Internal(String::new()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(ToolError::kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
        assert!(errors[4].is_transient());
        assert!(!errors[5].is_transient());
    }

    #[test]
    fn test_unserializable_result_is_internal() {
        // Map keys must serialize as strings.
        let bad: std::collections::BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into();
        let err = ToolOutput::json(&bad, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), "internal");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_validate_schema_valid() {
        let errors = validate_tool_schema(&EchoTool.parameters_schema(), "echo");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert!(validate_tool_schema(&empty_parameters(), "empty").is_empty());
    }

    #[test]
    fn test_validate_schema_wrong_type() {
        let errors = validate_tool_schema(&serde_json::json!({"type": "string"}), "test");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("expected type \"object\""));
    }

    #[test]
    fn test_validate_schema_required_not_in_properties() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "sku": { "type": "string" }
            },
            "required": ["sku", "quantity"]
        });
        let errors = validate_tool_schema(&schema, "test");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("\"quantity\" not found in properties"));
    }

    #[test]
    fn test_validate_schema_array_missing_items() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "description": "Tags" }
            }
        });
        let errors = validate_tool_schema(&schema, "test");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("array property missing \"items\""));
    }
}
