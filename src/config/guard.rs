use secrecy::SecretString;

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Access guard configuration.
#[derive(Clone, Default)]
pub struct GuardConfig {
    /// Shared secret required by guarded operations. `None` means the
    /// deployment never configured one.
    pub secret: Option<SecretString>,
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("secret", &self.secret.is_some())
            .finish()
    }
}

impl GuardConfig {
    /// Config with a known secret, mostly for tests and embedding.
    ///
    /// A blank secret counts as unset, the same rule `GUARD_SECRET` follows.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            secret: (!secret.trim().is_empty()).then(|| SecretString::from(secret)),
        }
    }

    /// An empty or whitespace-only `GUARD_SECRET` counts as unset.
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        Ok(optional_env("GUARD_SECRET")?
            .map(Self::with_secret)
            .unwrap_or_default())
    }
}
