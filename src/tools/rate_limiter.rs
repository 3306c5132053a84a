//! Per-client sliding-window rate limiter.
//!
//! Each client identity keeps the timestamps of its admitted calls. Before
//! every admission decision the log is pruned to the trailing window, so the
//! boundary moves continuously with the clock instead of resetting at fixed
//! intervals.
//!
//! # Persistence
//!
//! Rate limit state is in-memory only. Limits reset on process restart.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::LimiterConfig;
use crate::tools::tool::ToolError;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed and has been recorded.
    Allowed {
        /// Admissions left in the current window.
        remaining: usize,
    },
    /// Request is rate limited; nothing was recorded.
    Limited {
        /// When the oldest hit leaves the window.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission log for a single client.
#[derive(Debug, Default)]
struct ClientHitLog {
    hits: VecDeque<Instant>,
}

impl ClientHitLog {
    /// Drop hits older than `window`. Hits are appended in clock order, so
    /// stale entries are always at the front.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) > window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        self.hits
            .front()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(Duration::ZERO)
    }
}

/// In-memory sliding-window limiter keyed by client id.
///
/// Prune, check and append happen under one lock so two concurrent calls
/// can never both take the last slot.
pub struct WindowLimiter {
    config: LimiterConfig,
    state: Mutex<HashMap<String, ClientHitLog>>,
}

impl WindowLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Check if a call is allowed and record it if so.
    pub async fn admit(&self, client_id: &str) -> RateLimitResult {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let log = state.entry(client_id.to_string()).or_default();

        log.prune(now, self.config.window);

        if log.hits.len() >= self.config.max_requests {
            let retry_after = log.retry_after(now, self.config.window);
            tracing::debug!(
                client_id = %client_id,
                hits = log.hits.len(),
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            return RateLimitResult::Limited { retry_after };
        }

        log.hits.push_back(now);
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - log.hits.len(),
        }
    }

    /// Number of hits currently inside the window for a client.
    pub async fn usage(&self, client_id: &str) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        match state.get_mut(client_id) {
            Some(log) => {
                log.prune(now, self.config.window);
                log.hits.len()
            }
            None => 0,
        }
    }

    /// Clear rate limit state for a client.
    pub async fn clear(&self, client_id: &str) {
        self.state.lock().await.remove(client_id);
    }
}

impl Default for WindowLimiter {
    fn default() -> Self {
        Self::new(LimiterConfig::default())
    }
}

/// Error when rate limited.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimitError {
    pub retry_after: Duration,
}

impl From<RateLimitResult> for Result<(), RateLimitError> {
    fn from(result: RateLimitResult) -> Self {
        match result {
            RateLimitResult::Allowed { .. } => Ok(()),
            RateLimitResult::Limited { retry_after } => Err(RateLimitError { retry_after }),
        }
    }
}

impl From<RateLimitError> for ToolError {
    fn from(err: RateLimitError) -> Self {
        ToolError::RateLimitExceeded {
            retry_after: err.retry_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64, max: usize) -> WindowLimiter {
        WindowLimiter::new(LimiterConfig::new(Duration::from_secs(window_secs), max))
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowed_within_limits() {
        let limiter = limiter(60, 5);
        assert_eq!(
            limiter.admit("client1").await,
            RateLimitResult::Allowed { remaining: 4 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_call_in_window_is_limited() {
        let limiter = limiter(60, 5);

        for _ in 0..5 {
            assert!(limiter.admit("client1").await.is_allowed());
            tokio::time::advance(Duration::from_secs(1)).await;
        }

        match limiter.admit("client1").await {
            RateLimitResult::Limited { retry_after } => {
                // The first hit was 5s ago, so it leaves the window in 55s.
                assert_eq!(retry_after, Duration::from_secs(55));
            }
            other => panic!("Expected limited, got {other:?}"),
        }
        // Rejections are not recorded.
        assert_eq!(limiter.usage("client1").await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_resumes_after_window() {
        let limiter = limiter(60, 5);
        for _ in 0..5 {
            limiter.admit("client1").await;
        }
        assert!(!limiter.admit("client1").await.is_allowed());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.admit("client1").await.is_allowed());
        assert_eq!(limiter.usage("client1").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides_with_partial_drain() {
        let limiter = limiter(60, 2);

        limiter.admit("client1").await; // t=0
        tokio::time::advance(Duration::from_secs(40)).await;
        limiter.admit("client1").await; // t=40
        assert!(!limiter.admit("client1").await.is_allowed());

        // t=61: only the t=0 hit has left; one slot frees up.
        tokio::time::advance(Duration::from_secs(21)).await;
        assert!(limiter.admit("client1").await.is_allowed());
        assert!(!limiter.admit("client1").await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_isolation() {
        let limiter = limiter(60, 1);

        limiter.admit("client1").await;
        let result1 = limiter.admit("client1").await;
        let result2 = limiter.admit("client2").await;

        assert!(!result1.is_allowed());
        assert!(result2.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let limiter = limiter(60, 1);

        limiter.admit("client1").await;
        assert!(!limiter.admit("client1").await.is_allowed());

        limiter.clear("client1").await;
        assert!(limiter.admit("client1").await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_rejects_everything() {
        let limiter = limiter(60, 0);
        let result: Result<(), RateLimitError> = limiter.admit("client1").await.into();
        let err = ToolError::from(result.unwrap_err());
        assert_eq!(err.kind(), "rate_limit_exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_window_reports_retry_after() {
        let limiter = limiter(u64::MAX, 1);
        assert!(limiter.admit("client1").await.is_allowed());
        tokio::time::advance(Duration::from_secs(10)).await;

        match limiter.admit("client1").await {
            RateLimitResult::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(u64::MAX - 10));
            }
            other => panic!("Expected limited, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admits_never_exceed_max() {
        const MAX: usize = 5;
        const CALLS: usize = 40;
        let limiter = std::sync::Arc::new(limiter(60, MAX));

        let handles: Vec<_> = (0..CALLS)
            .map(|_| {
                let limiter = std::sync::Arc::clone(&limiter);
                tokio::spawn(async move { limiter.admit("shared").await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().is_allowed() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, MAX);
        assert_eq!(limiter.usage("shared").await, MAX);
    }
}
