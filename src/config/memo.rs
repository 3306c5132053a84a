use std::time::Duration;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

/// Expiring memo configuration.
#[derive(Debug, Clone)]
pub struct MemoConfig {
    /// How long a computed entry stays valid.
    pub ttl: Duration,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
        }
    }
}

impl MemoConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let ttl_secs: u64 = parse_optional_env("MEMO_TTL_SECS", Self::default().ttl.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MEMO_TTL_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}
