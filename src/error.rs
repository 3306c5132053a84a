//! Error types shared across the crate.
//!
//! Tool-call failures live in [`crate::tools::ToolError`]; each component
//! keeps its own error enum and converts into it at the tool boundary.

use thiserror::Error;

/// Configuration errors raised while resolving startup settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
