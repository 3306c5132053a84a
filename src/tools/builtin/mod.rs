//! Built-in tools fronting the stateful components.

mod guard;
mod jobs;
mod ledger;
mod limiter;
mod memo;
mod server;

pub use guard::{GuardedOpTool, PublicOpTool};
pub use jobs::{JobStatusTool, SubmitJobTool};
pub use ledger::{CancelOrderTool, CheckAvailabilityTool, CreateOrderTool, GetOrderTool};
pub use limiter::{AdmitTool, LimiterConfigTool};
pub use memo::{ComputeOrFetchTool, MemoStatsTool};
pub use server::{HealthTool, MetricsTool};
