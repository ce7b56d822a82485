//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// A stored value with its absolute expiration timestamp.
///
/// Entries are immutable once built; expiry is a pure function of the
/// timestamp it is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    value: V,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now_ms`.
    pub fn new(value: V, now_ms: u64, ttl: Duration) -> Self {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Self {
            value,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    // == Is Expired ==
    /// Checks the entry against `now_ms`.
    ///
    /// Boundary condition: an entry whose expiration equals `now_ms` is still
    /// live. It only expires once the current time is strictly greater.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now_ms`, zero once expired.
    pub fn ttl_remaining_at(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now_ms))
    }

    pub fn into_value(self) -> V {
        self.value
    }
}
