//! Process-local validation cache.

pub mod entry;
pub mod store;

use crate::SentinelError;
use std::time::Duration;

/// Key/value store used by the validator for cache-aside lookups.
///
/// Every operation is fallible so that stores backed by something less
/// reliable than a `HashMap` can report failures; the validator logs them and
/// degrades to a miss.
pub trait CacheStore<V>: Send {
    /// Fetch a live value. Expired entries are purged and reported absent.
    fn get(&mut self, key: &str) -> Result<Option<V>, SentinelError>;

    /// Store a value; `None` uses the store's default TTL.
    fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), SentinelError>;

    /// Remove a key if present.
    fn delete(&mut self, key: &str) -> Result<(), SentinelError>;

    /// Whether a live value exists. Expired entries are purged.
    fn has(&mut self, key: &str) -> Result<bool, SentinelError>;

    /// Drop every entry.
    fn clear(&mut self) -> Result<(), SentinelError>;

    /// Release the store. Drops every entry.
    fn close(&mut self) -> Result<(), SentinelError> {
        self.clear()
    }
}
