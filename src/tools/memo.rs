//! Expiring memoization of expensive computations.
//!
//! Entries are keyed by the SHA-256 digest of the input and carry an expiry.
//! Expiry is checked lazily on lookup: nothing sweeps the table, and an
//! expired entry is simply overwritten the next time its key is computed.
//! The table therefore grows with the number of distinct inputs seen.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::MemoConfig;

/// A memoized value and the instant it was computed.
///
/// Liveness compares elapsed time against the TTL rather than storing
/// `computed_at + ttl`, so any TTL is representable.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    computed_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_alive(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.computed_at) < ttl
    }
}

/// Outcome of [`ExpiringMemo::compute_or_fetch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup<V> {
    /// Whether the value came from the table without recomputation.
    pub cached: bool,
    pub value: V,
}

/// Table occupancy at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoStats {
    pub total: usize,
    pub alive: usize,
    pub ttl: Duration,
}

/// Time-bounded memo table keyed by input digest.
pub struct ExpiringMemo<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> ExpiringMemo<V> {
    pub fn new(config: &MemoConfig) -> Self {
        Self {
            ttl: config.ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the live entry for `input`, or run `compute` and store it.
    ///
    /// Lookup, computation and insert share one write lock, so concurrent
    /// callers with the same input compute it once.
    pub async fn compute_or_fetch<F>(&self, input: &str, compute: F) -> Lookup<V>
    where
        F: FnOnce(&str) -> V,
    {
        let key = digest(input);
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get(&key)
            && entry.is_alive(now, self.ttl)
        {
            tracing::debug!(key = %&key[..12], "Memo hit");
            return Lookup {
                cached: true,
                value: entry.value.clone(),
            };
        }

        tracing::debug!(key = %&key[..12], "Memo miss");
        let value = compute(input);
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                computed_at: now,
            },
        );

        Lookup {
            cached: false,
            value,
        }
    }

    /// Count entries, recomputing liveness against the current clock.
    pub async fn stats(&self) -> MemoStats {
        let now = Instant::now();
        let entries = self.entries.read().await;
        MemoStats {
            total: entries.len(),
            alive: entries.values().filter(|e| e.is_alive(now, self.ttl)).count(),
            ttl: self.ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Hex SHA-256 digest of the input's UTF-8 bytes.
pub fn digest(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Word statistics over a block of text; the computation the memo tool wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSummary {
    pub word_count: usize,
    pub first_words: String,
    pub last_words: String,
}

const SUMMARY_WORDS: usize = 10;

/// Summarize text into its word count and its first and last ten words.
pub fn summarize(text: &str) -> TextSummary {
    let words: Vec<&str> = text.split_whitespace().collect();
    let tail_start = words.len().saturating_sub(SUMMARY_WORDS);
    TextSummary {
        word_count: words.len(),
        first_words: words.iter().take(SUMMARY_WORDS).copied().collect::<Vec<_>>().join(" "),
        last_words: words[tail_start..].join(" "),
    }
}
