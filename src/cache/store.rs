//! In-memory TTL cache with lazy expiry.
//!
//! There is no sweeper: an expired entry is purged when it is next read
//! through `get` or `has`, or dropped wholesale by `clear`/`close`.

use crate::cache::entry::CacheEntry;
use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::SentinelError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Process-local key/value store with per-entry TTL.
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache using `default_ttl` when `set` gets no TTL.
    pub fn new(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
            clock,
        }
    }

    /// The TTL used when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_entry(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        let now = self.clock.now_utc();
        if self.entries.get(key)?.is_expired(now) {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key)
    }
}

impl<V: Clone + Send> CacheStore<V> for TtlCache<V> {
    fn get(&mut self, key: &str) -> Result<Option<V>, SentinelError> {
        Ok(self.live_entry(key).map(|entry| entry.value.clone()))
    }

    fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) -> Result<(), SentinelError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, self.clock.now_utc(), ttl);
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), SentinelError> {
        self.entries.remove(key);
        Ok(())
    }

    fn has(&mut self, key: &str) -> Result<bool, SentinelError> {
        Ok(self.live_entry(key).is_some())
    }

    fn clear(&mut self) -> Result<(), SentinelError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MockClock, SystemClock};

    fn mock_cache(default_ttl: Duration) -> (TtlCache<String>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::from_rfc3339("2025-01-15T12:00:00Z"));
        (TtlCache::new(default_ttl, clock.clone()), clock)
    }

    #[test]
    fn test_set_and_get() {
        let (mut cache, _) = mock_cache(Duration::from_secs(3600));
        cache.set("k", "v".to_string(), None).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some("v".to_string()));
        assert!(cache.has("k").unwrap());
    }

    #[test]
    fn test_get_missing() {
        let (mut cache, _) = mock_cache(Duration::from_secs(3600));
        assert_eq!(cache.get("missing").unwrap(), None);
        assert!(!cache.has("missing").unwrap());
    }

    #[test]
    fn test_default_ttl_applies() {
        let (mut cache, clock) = mock_cache(Duration::from_secs(60));
        cache.set("k", "v".to_string(), None).unwrap();

        clock.advance(chrono::Duration::seconds(59));
        assert!(cache.has("k").unwrap());

        clock.advance(chrono::Duration::seconds(1));
        assert!(!cache.has("k").unwrap());
    }

    #[test]
    fn test_explicit_ttl_overrides_default() {
        let (mut cache, clock) = mock_cache(Duration::from_secs(60));
        cache.set("k", "v".to_string(), Some(Duration::from_secs(600))).unwrap();

        clock.advance(chrono::Duration::seconds(120));
        assert_eq!(cache.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_expired_entry_purged_on_read() {
        let (mut cache, clock) = mock_cache(Duration::from_secs(1));
        cache.set("k", "v".to_string(), None).unwrap();
        clock.advance(chrono::Duration::seconds(5));

        // Still resident until someone looks at it.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let (mut cache, clock) = mock_cache(Duration::from_secs(60));
        cache.set("k", "old".to_string(), None).unwrap();
        clock.advance(chrono::Duration::seconds(50));
        cache.set("k", "new".to_string(), None).unwrap();
        clock.advance(chrono::Duration::seconds(50));
        assert_eq!(cache.get("k").unwrap(), Some("new".to_string()));
    }

    #[test]
    fn test_delete() {
        let (mut cache, _) = mock_cache(Duration::from_secs(60));
        cache.set("k", "v".to_string(), None).unwrap();
        cache.delete("k").unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
        // Deleting a missing key is fine.
        cache.delete("k").unwrap();
    }

    #[test]
    fn test_clear_and_close_drop_everything() {
        let (mut cache, _) = mock_cache(Duration::from_secs(60));
        cache.set("a", "1".to_string(), None).unwrap();
        cache.set("b", "2".to_string(), None).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty());

        cache.set("c", "3".to_string(), None).unwrap();
        cache.close().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_wall_clock_expiry() {
        let mut cache: TtlCache<String> = TtlCache::new(Duration::from_secs(60), Arc::new(SystemClock));
        cache.set("k", "v".to_string(), Some(Duration::from_secs(1))).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some("v".to_string()));

        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(cache.get("k").unwrap(), None);
    }
}
