//! Cache entry with absolute expiry.

use chrono::{DateTime, Utc};

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value.
    pub value: V,

    /// Expiry instant. The entry is dead once `now >= expires_at`.
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Create an entry expiring `ttl` after `now`.
    pub fn new(value: V, now: DateTime<Utc>, ttl: std::time::Duration) -> Self {
        Self {
            value,
            expires_at: now + to_chrono(ttl),
        }
    }

    /// Whether the entry is expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Longest TTL honoured; larger values are clamped so the expiry stays representable.
const MAX_TTL: std::time::Duration = std::time::Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn to_chrono(ttl: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl.min(MAX_TTL)).unwrap_or_else(|_| chrono::Duration::days(36_500))
}
