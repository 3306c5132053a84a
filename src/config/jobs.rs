use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

/// Background job configuration.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// Smallest accepted duration hint, in seconds.
    pub min_duration_secs: u64,
    /// Largest accepted duration hint, in seconds.
    pub max_duration_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 0,
            max_duration_secs: 120,
        }
    }
}

impl JobsConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let min_duration_secs =
            parse_optional_env("JOBS_MIN_DURATION_SECS", defaults.min_duration_secs)?;
        let max_duration_secs =
            parse_optional_env("JOBS_MAX_DURATION_SECS", defaults.max_duration_secs)?;

        if min_duration_secs > max_duration_secs {
            return Err(ConfigError::InvalidValue {
                key: "JOBS_MIN_DURATION_SECS".to_string(),
                message: format!(
                    "must not exceed JOBS_MAX_DURATION_SECS ({max_duration_secs})"
                ),
            });
        }

        Ok(Self {
            min_duration_secs,
            max_duration_secs,
        })
    }

    /// Whether a duration hint falls inside the accepted bound.
    pub fn accepts(&self, duration_secs: i64) -> bool {
        duration_secs >= 0
            && (duration_secs as u64) >= self.min_duration_secs
            && (duration_secs as u64) <= self.max_duration_secs
    }
}
