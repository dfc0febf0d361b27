use crate::error::CacheError;
use std::time::Duration;

/// A key/value store mapping short-lived opaque ids to the values they stand for.
///
/// Implementations must be shareable across tasks. Expired and missing keys are
/// indistinguishable to callers: both surface as [`CacheError::Miss`].
pub trait CorrelationStore: Send + Sync {
    /// Stores `value` under `key` with the store's default TTL, replacing any previous entry.
    fn set(&self, key: &str, value: &str);

    /// Stores `value` under `key` with its own TTL.
    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration);

    /// # Errors
    /// Returns [`CacheError::Miss`] if the key is absent or expired.
    fn get(&self, key: &str) -> Result<String, CacheError>;

    fn remove(&self, key: &str);
}
