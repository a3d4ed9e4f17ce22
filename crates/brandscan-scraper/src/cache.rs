//! Caller-owned, time-bounded store of finished scans keyed by
//! [`ScanRequest::cache_key`](crate::scan::ScanRequest::cache_key).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use brandscan_core::AppConfig;

use crate::scan::ScanResult;

#[derive(Debug, Clone)]
struct CachedResult {
    stored_at: Instant,
    result: ScanResult,
}

/// Results expire `ttl` after they were stored. Expiry is checked on read;
/// expired entries are purged on the next insert.
#[derive(Debug, Clone)]
pub struct ResultCache {
    ttl: Duration,
    entries: HashMap<String, CachedResult>,
}

impl ResultCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cache whose TTL is `BRANDSCAN_RESULT_TTL_SECS`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_secs(config.result_ttl_secs))
    }

    /// The stored result for `key`, unless it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScanResult> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<&ScanResult> {
        self.entries
            .get(key)
            .filter(|cached| self.is_fresh(cached, now))
            .map(|cached| &cached.result)
    }

    /// Stores `result` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: String, result: ScanResult) {
        self.insert_at(key, result, Instant::now());
    }

    fn insert_at(&mut self, key: String, result: ScanResult, now: Instant) {
        self.purge_expired(now);
        self.entries.insert(
            key,
            CachedResult {
                stored_at: now,
                result,
            },
        );
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, cached| now.saturating_duration_since(cached.stored_at) < ttl);
    }

    fn is_fresh(&self, cached: &CachedResult, now: Instant) -> bool {
        now.saturating_duration_since(cached.stored_at) < self.ttl
    }
}
