//! Toolhouse: five independent pieces of server-side state exposed to an
//! agent as named tool calls.
//!
//! - [`tools::ExpiringMemo`]: TTL-bounded memo of a text summary
//! - [`tools::WindowLimiter`]: per-client sliding-window admission
//! - [`jobs::JobTracker`]: background jobs with pollable status
//! - [`guard::AccessGuard`]: shared-secret gate in front of an audit log
//! - [`ledger::LifecycleLedger`]: inventory reservations through an order lifecycle
//!
//! [`toolbox::Toolbox`] owns one of each; [`tools::ToolRegistry`] routes
//! calls to them by name.

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod jobs;
pub mod ledger;
pub mod toolbox;
pub mod tools;

pub use config::Config;
pub use error::ConfigError;
pub use toolbox::Toolbox;
