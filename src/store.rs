// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bounded cooldown store.
//!
//! Maps namespaced keys (`ip:<addr>`, `email:<address>`) to the submission
//! that last claimed them. Two independent limits apply:
//!
//! - capacity: inserting past the bound evicts the least-recently-used key,
//!   however young its entry is;
//! - TTL: every entry expires a fixed time after insertion, however recently
//!   it was read.

use crate::clock::Clock;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One accepted submission. Shared by the address key and the email key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Acceptance time in epoch milliseconds
    pub timestamp: u64,
    /// Lower-cased submitter email
    pub normalized_email: String,
    /// Resolved client address
    pub client_address: String,
}

/// Key/value capability the limiter runs against.
///
/// `get` takes `&mut self` because a hit refreshes the key's recency.
pub trait RateLimitStore: Send {
    /// Live entry for `key`, if any. Expired entries are dropped and not returned.
    fn get(&mut self, key: &str) -> Option<Arc<RateLimitEntry>>;

    /// Insert or replace the entry for `key`, restarting its TTL.
    fn insert(&mut self, key: String, entry: Arc<RateLimitEntry>);

    /// Remove `key`. Returns whether it was present.
    fn remove(&mut self, key: &str) -> bool;

    /// Number of stored keys, expired-but-unswept ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were dropped.
    fn purge_expired(&mut self) -> usize;
}

#[derive(Debug)]
struct Slot {
    entry: Arc<RateLimitEntry>,
    expires_at: u64,
}

/// LRU map with a per-entry TTL.
pub struct LruTtlStore {
    slots: LruCache<String, Slot>,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl LruTtlStore {
    pub fn new(capacity: NonZeroUsize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: LruCache::new(capacity),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            clock,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.cap().get()
    }
}

impl RateLimitStore for LruTtlStore {
    fn get(&mut self, key: &str) -> Option<Arc<RateLimitEntry>> {
        let now = self.clock.now_millis();
        let expired = match self.slots.peek(key) {
            Some(slot) => now >= slot.expires_at,
            None => return None,
        };

        if expired {
            self.slots.pop(key);
            debug!(key, "Dropped expired cooldown entry");
            return None;
        }

        self.slots.get(key).map(|slot| Arc::clone(&slot.entry))
    }

    fn insert(&mut self, key: String, entry: Arc<RateLimitEntry>) {
        let expires_at = self.clock.now_millis().saturating_add(self.ttl_ms);
        if let Some((evicted, _)) = self.slots.push(key.clone(), Slot { entry, expires_at }) {
            if evicted != key {
                debug!(key = %evicted, "Evicted least-recently-used cooldown entry");
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        self.slots.pop(key).is_some()
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let expired: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| now >= slot.expires_at)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.slots.pop(key);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn entry(timestamp: u64) -> Arc<RateLimitEntry> {
        Arc::new(RateLimitEntry {
            timestamp,
            normalized_email: "visitor@example.com".to_string(),
            client_address: "203.0.113.7".to_string(),
        })
    }

    fn store(capacity: usize, clock: Arc<ManualClock>) -> LruTtlStore {
        LruTtlStore::new(
            NonZeroUsize::new(capacity).unwrap(),
            Duration::from_secs(60),
            clock,
        )
    }

    #[test]
    fn test_get_returns_inserted_entry() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(4, clock);

        store.insert("ip:1".to_string(), entry(0));
        assert_eq!(store.get("ip:1").unwrap().timestamp, 0);
        assert!(store.get("ip:2").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(4, clock.clone());

        store.insert("ip:1".to_string(), entry(0));
        clock.advance(Duration::from_millis(59_999));
        assert!(store.get("ip:1").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get("ip:1").is_none());
        assert_eq!(store.len(), 0, "expired entry is dropped on lookup");
    }

    #[test]
    fn test_reads_do_not_extend_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(4, clock.clone());

        store.insert("ip:1".to_string(), entry(0));
        for _ in 0..5 {
            clock.advance(Duration::from_secs(10));
            store.get("ip:1");
        }
        clock.advance(Duration::from_secs(10));
        assert!(store.get("ip:1").is_none());
    }

    #[test]
    fn test_lru_eviction_respects_recency() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(2, clock);

        store.insert("a".to_string(), entry(0));
        store.insert("b".to_string(), entry(0));
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(store.get("a").is_some());
        store.insert("c".to_string(), entry(0));

        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_replacing_key_does_not_evict() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(2, clock.clone());

        store.insert("a".to_string(), entry(0));
        store.insert("b".to_string(), entry(0));
        clock.advance(Duration::from_secs(30));
        store.insert("a".to_string(), entry(30_000));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().timestamp, 30_000);
        assert!(store.get("b").is_some());
    }

    #[test]
    fn test_replacing_key_restarts_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(2, clock.clone());

        store.insert("a".to_string(), entry(0));
        clock.advance(Duration::from_secs(50));
        store.insert("a".to_string(), entry(50_000));
        clock.advance(Duration::from_secs(50));

        assert!(store.get("a").is_some());
    }

    #[test]
    fn test_remove() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(2, clock);

        store.insert("a".to_string(), entry(0));
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = store(8, clock.clone());

        store.insert("old-1".to_string(), entry(0));
        store.insert("old-2".to_string(), entry(0));
        clock.advance(Duration::from_secs(30));
        store.insert("young".to_string(), entry(30_000));
        clock.advance(Duration::from_secs(30));

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get("young").is_some());
    }
}
