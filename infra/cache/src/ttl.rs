use crate::error::CacheError;
use crate::store::CorrelationStore;
use moka::Expiry;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with, restarting the clock on replace.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory [`CorrelationStore`] bounded by entry count.
#[derive(Clone)]
pub struct TtlCache {
    entries: Cache<String, Entry>,
    default_ttl: Duration,
}

impl TtlCache {
    /// Creates a cache holding at most `capacity` entries, each living `default_ttl` unless
    /// stored through [`CorrelationStore::set_with_ttl`].
    ///
    /// A full cache always admits the newest entry and evicts the least recently used one.
    #[must_use]
    pub fn new(capacity: u64, default_ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(PerEntryTtl)
            .build();
        Self { entries, default_ttl }
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CorrelationStore for TtlCache {
    fn set(&self, key: &str, value: &str) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) {
        self.entries.insert(key.to_owned(), Entry { value: value.to_owned(), ttl });
        trace!(key, ttl_ms = ttl.as_millis(), "Cache entry stored");
    }

    fn get(&self, key: &str) -> Result<String, CacheError> {
        self.entries.get(key).map(|entry| entry.value).ok_or_else(|| CacheError::miss(key))
    }

    fn remove(&self, key: &str) {
        self.entries.invalidate(key);
    }
}
