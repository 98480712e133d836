use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::rates::{RateCacheEntry, RateError, RateKey};

/// Default quote lifetime: 24 hours.
pub const DEFAULT_TTL_MINUTES: i64 = 1440;

/// Time-boxed cache of carrier quotes. `put` is an upsert — the same key
/// always overwrites, never duplicates — so concurrent misses for one route
/// cannot violate key uniqueness.
#[async_trait]
pub trait RateCache: Send + Sync {
    async fn put(&self, entry: RateCacheEntry) -> Result<(), RateError>;

    /// Look up an entry, re-checking expiry at read time. Stale entries are
    /// reported absent.
    async fn find_valid(&self, key: &RateKey) -> Result<Option<RateCacheEntry>, RateError>;
}

/// HashMap-backed cache, the reference implementation for tests.
pub struct MemoryRateCache {
    entries: Mutex<HashMap<RateKey, RateCacheEntry>>,
}

impl MemoryRateCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop physically-present entries that are past their expiry.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

impl Default for MemoryRateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateCache for MemoryRateCache {
    async fn put(&self, entry: RateCacheEntry) -> Result<(), RateError> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn find_valid(&self, key: &RateKey) -> Result<Option<RateCacheEntry>, RateError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(Utc::now()))
            .cloned())
    }
}
