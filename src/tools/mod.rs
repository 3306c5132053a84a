//! Tool-call boundary.
//!
//! Every operation is a named [`Tool`] taking a flat JSON argument object
//! and returning either a JSON payload or one typed [`ToolError`]. The
//! memo table and the rate limiter live here alongside the tools; the job
//! tracker, guard and ledger have their own top-level modules.

pub mod builtin;
pub mod memo;
pub mod rate_limiter;

mod registry;
mod tool;

pub use memo::ExpiringMemo;
pub use rate_limiter::{RateLimitResult, WindowLimiter};
pub use registry::{CallMetrics, MetricsSnapshot, ToolRegistry};
pub use tool::{
    CallContext, Tool, ToolError, ToolOutput, ToolSchema, empty_parameters, require_i64,
    require_param, require_str, validate_tool_schema,
};
