//! Response cache (normalized query → validated answer).
//!
//! Only validated answers are stored — handoffs are often context-sensitive
//! ("my scan") and must not be memoized as if they were query-invariant.
//! Expiry is lazy: `get` removes an entry once `ttl` has elapsed; there is
//! no background sweep. At capacity, `set` evicts the single oldest-inserted
//! entry before inserting. The O(capacity) eviction scan is fine at the
//! configured capacity (~100 entries).

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::hashing::hash_query;
use crate::pipeline::ChatResult;

/// Observability counters. They never affect behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
}

struct CacheEntry {
    result: ChatResult,
    inserted_at: Instant,
    /// Monotonic insertion sequence; eviction removes the minimum.
    seq: u64,
}

struct CacheInner {
    entries: HashMap<[u8; 32], CacheEntry>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

/// Bounded TTL cache for chat results, safe to share across tasks.
///
/// All access goes through one mutex, so expiry-check-then-remove and
/// evict-then-insert are each atomic.
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                next_seq: 0,
                hits: 0,
                misses: 0,
            }),
            max_size,
            ttl,
        }
    }

    /// Returns a clone of the cached result for `query`, or `None`. Expired
    /// entries are removed on the spot and count as misses.
    pub fn get(&self, query: &str) -> Option<ChatResult> {
        let key = hash_query(query);
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.entries.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                let result = entry.result.clone();
                inner.hits += 1;
                debug!(hits = inner.hits, "Response cache hit");
                return Some(result);
            }
            inner.entries.remove(&key);
            debug!("Expired cache entry removed");
        }

        inner.misses += 1;
        None
    }

    /// Stores a validated answer under the normalized query key, evicting
    /// the oldest entry first when at capacity.
    pub fn set(&self, query: &str, result: &ChatResult) {
        let key = hash_query(query);
        let mut inner = self.inner.lock();

        if inner.entries.len() >= self.max_size && !inner.entries.contains_key(&key) {
            if let Some(oldest) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| *k)
            {
                inner.entries.remove(&oldest);
                debug!("Evicted oldest cache entry");
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            CacheEntry {
                result: result.clone(),
                inserted_at: Instant::now(),
                seq,
            },
        );
    }

    /// Number of live entries (including any not-yet-expired ones).
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Hit/miss counters and current size.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let total = inner.hits + inner.misses;
        let hit_rate_percent = if total > 0 {
            (inner.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate_percent,
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .finish()
    }
}
