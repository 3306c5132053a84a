//! Configuration for the tool state layer.
//!
//! Every value is read once at startup from the environment (optionally
//! seeded from a `.env` file) and is fixed for the process lifetime.

mod guard;
pub(crate) mod helpers;
mod jobs;
mod ledger;
mod limiter;
mod memo;

pub use guard::GuardConfig;
pub use jobs::JobsConfig;
pub use ledger::{LedgerConfig, parse_inventory};
pub use limiter::LimiterConfig;
pub use memo::MemoConfig;

use crate::error::ConfigError;

/// Top-level configuration, one section per tool family.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub memo: MemoConfig,
    pub limiter: LimiterConfig,
    pub jobs: JobsConfig,
    pub guard: GuardConfig,
    pub ledger: LedgerConfig,
}

impl Config {
    /// Resolve configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            memo: MemoConfig::resolve()?,
            limiter: LimiterConfig::resolve()?,
            jobs: JobsConfig::resolve()?,
            guard: GuardConfig::resolve()?,
            ledger: LedgerConfig::resolve()?,
        })
    }
}
