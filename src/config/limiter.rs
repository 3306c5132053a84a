use std::time::Duration;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

/// Sliding-window limiter configuration.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Length of the trailing window.
    pub window: Duration,
    /// Admissions allowed per client inside one window.
    pub max_requests: usize,
}

impl Default for LimiterConfig {
    /// Default: 5 requests per 60 seconds.
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 5,
        }
    }
}

impl LimiterConfig {
    /// Create a config with explicit limits.
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
        }
    }

    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let window_secs: u64 =
            parse_optional_env("LIMITER_WINDOW_SECS", defaults.window.as_secs())?;
        let max_requests = parse_optional_env("LIMITER_MAX_REQUESTS", defaults.max_requests)?;

        if window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LIMITER_WINDOW_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self::new(Duration::from_secs(window_secs), max_requests))
    }
}
