//! Shared-secret access guard for sensitive operations.
//!
//! A missing server secret is reported as `Misconfigured`, never folded into
//! `Unauthorized`, so operators can tell a bad deployment from a bad caller.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

use crate::config::GuardConfig;
use crate::tools::ToolError;

/// Why a guarded call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("server secret is not configured (GUARD_SECRET)")]
    Misconfigured,

    #[error("invalid credential")]
    Unauthorized,
}

impl From<GuardError> for ToolError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Misconfigured => ToolError::Misconfigured(err.to_string()),
            GuardError::Unauthorized => ToolError::Unauthorized(err.to_string()),
        }
    }
}

/// One entry in the guard's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub sequence: u64,
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Gates operations behind a secret fixed at startup.
pub struct AccessGuard {
    secret: Option<SecretString>,
    audit_log: Mutex<Vec<AuditRecord>>,
}

impl AccessGuard {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            audit_log: Mutex::new(Vec::new()),
        }
    }

    /// Always permitted.
    pub fn public_op(&self) -> &'static str {
        "pong"
    }

    /// Check the credential; exact byte equality, compared in constant time.
    pub fn authorize(&self, credential: &str) -> Result<(), GuardError> {
        let secret = self.secret.as_ref().ok_or(GuardError::Misconfigured)?;
        if bool::from(
            credential
                .as_bytes()
                .ct_eq(secret.expose_secret().as_bytes()),
        ) {
            Ok(())
        } else {
            Err(GuardError::Unauthorized)
        }
    }

    /// Append an audit record if `credential` matches the server secret.
    pub async fn guarded_op(
        &self,
        credential: &str,
        message: &str,
    ) -> Result<AuditRecord, GuardError> {
        if let Err(e) = self.authorize(credential) {
            tracing::warn!(reason = %e, "Guarded call denied");
            return Err(e);
        }

        let mut log = self.audit_log.lock().await;
        let record = AuditRecord {
            sequence: log.len() as u64 + 1,
            at: Utc::now(),
            message: message.to_string(),
        };
        log.push(record.clone());
        tracing::info!(sequence = record.sequence, "Audit record saved");
        Ok(record)
    }

    /// Copy of the audit log.
    pub async fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit_log.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_public_op_needs_no_secret() {
        let guard = AccessGuard::new(&GuardConfig::default());
        assert_eq!(guard.public_op(), "pong");
    }

    #[tokio::test]
    async fn test_unset_secret_is_misconfigured() {
        let guard = AccessGuard::new(&GuardConfig::default());

        // Even an empty credential must not slip through.
        for credential in ["", "anything"] {
            let err = guard.guarded_op(credential, "msg").await.unwrap_err();
            assert_eq!(err, GuardError::Misconfigured);
        }
        assert!(guard.audit_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_credential_is_unauthorized() {
        let guard = AccessGuard::new(&GuardConfig::with_secret("s3cret"));

        for credential in ["", "s3cre", "s3cret ", "S3CRET"] {
            let err = guard.guarded_op(credential, "msg").await.unwrap_err();
            assert_eq!(err, GuardError::Unauthorized, "credential {credential:?}");
        }
        assert!(guard.audit_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_correct_credential_appends_record() {
        let guard = AccessGuard::new(&GuardConfig::with_secret("s3cret"));

        let first = guard.guarded_op("s3cret", "rotated keys").await.unwrap();
        let second = guard.guarded_op("s3cret", "purged cache").await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);

        let log = guard.audit_records().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "rotated keys");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ToolError::from(GuardError::Misconfigured).kind(), "misconfigured");
        assert_eq!(ToolError::from(GuardError::Unauthorized).kind(), "unauthorized");
    }
}
