//! Request-fingerprint result cache with TTL and LRU eviction.
//!
//! The cache is an injected value owned by the pipeline instance — there
//! is no process-wide singleton. One mutex guards the map and the
//! recency queue; hits return cloned snapshots, so readers never observe
//! later mutation.
//!
//! # Invariants
//!
//! - An expired entry is never returned; it is dropped on the access that
//!   discovers it.
//! - Inserting a new fingerprint at capacity evicts the
//!   least-recently-accessed entry.
//! - Time flows through the injected [`Clock`], so TTL behavior is
//!   deterministic under test.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::types::{CacheEntry, DecodedPage};

/// A cache hit: the stored result list and its pre-truncation tally.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResults {
    pub results: Vec<DecodedPage>,
    pub total_found: usize,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Access order, least recent at the front.
    recency: VecDeque<String>,
}

impl CacheInner {
    fn touch(&mut self, fingerprint: &str) {
        if let Some(pos) = self.recency.iter().position(|f| f == fingerprint) {
            self.recency.remove(pos);
        }
        self.recency.push_back(fingerprint.to_string());
    }

    fn remove(&mut self, fingerprint: &str) -> Option<CacheEntry> {
        if let Some(pos) = self.recency.iter().position(|f| f == fingerprint) {
            self.recency.remove(pos);
        }
        self.entries.remove(fingerprint)
    }
}

/// TTL + LRU memoization of search results, keyed by request fingerprint.
pub struct SearchCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl SearchCache {
    /// Create a cache from configuration and an injected clock.
    #[must_use]
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            ttl: Duration::seconds(config.ttl_seconds as i64),
            max_entries: config.max_entries.max(1),
            clock,
        }
    }

    /// Look up a fingerprint.
    ///
    /// Returns a cloned snapshot if the entry exists and is fresh;
    /// promotes the entry to most-recently-used. Discovering an expired
    /// entry removes it and misses.
    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<CachedResults> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let fresh = match inner.entries.get(fingerprint) {
            Some(entry) => now - entry.created_at < self.ttl,
            None => return None,
        };

        if !fresh {
            debug!(fingerprint, "cache entry expired");
            inner.remove(fingerprint);
            return None;
        }

        inner.touch(fingerprint);
        inner.entries.get(fingerprint).map(|entry| CachedResults {
            results: entry.results.clone(),
            total_found: entry.total_found,
        })
    }

    /// Insert or overwrite an entry, evicting the least-recently-used
    /// entry if a new fingerprint would exceed capacity.
    pub fn put(&self, fingerprint: String, results: Vec<DecodedPage>, total_found: usize) {
        let created_at = self.clock.now();
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(&fingerprint) {
            while inner.entries.len() >= self.max_entries {
                match inner.recency.pop_front() {
                    Some(oldest) => {
                        debug!(fingerprint = %oldest, "evicting least-recently-used entry");
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        inner.entries.insert(
            fingerprint.clone(),
            CacheEntry {
                fingerprint: fingerprint.clone(),
                results,
                total_found,
                created_at,
            },
        );
        inner.touch(&fingerprint);
    }

    /// Remove one entry.
    pub fn invalidate(&self, fingerprint: &str) {
        self.inner.lock().remove(fingerprint);
    }

    /// Remove all entries.
    pub fn flush(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.recency.clear();
    }

    /// Current entry count (including any not-yet-collected expired
    /// entries).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize all entries, least recently used first.
    ///
    /// Suitable for checkpointing by a surrounding control plane.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CacheEntry> {
        let inner = self.inner.lock();
        inner
            .recency
            .iter()
            .filter_map(|f| inner.entries.get(f).cloned())
            .collect()
    }

    /// Restore entries from a checkpoint.
    ///
    /// Entries already past TTL at restore time are dropped; the rest are
    /// inserted in the given order (so the last restored entry is the most
    /// recently used) under the usual capacity bound.
    pub fn restore(&self, entries: Vec<CacheEntry>) {
        let now = self.clock.now();
        for entry in entries {
            if now - entry.created_at >= self.ttl {
                debug!(fingerprint = %entry.fingerprint, "dropping expired checkpoint entry");
                continue;
            }
            let mut inner = self.inner.lock();
            if !inner.entries.contains_key(&entry.fingerprint) {
                while inner.entries.len() >= self.max_entries {
                    match inner.recency.pop_front() {
                        Some(oldest) => {
                            inner.entries.remove(&oldest);
                        }
                        None => break,
                    }
                }
            }
            let fingerprint = entry.fingerprint.clone();
            inner.entries.insert(fingerprint.clone(), entry);
            inner.touch(&fingerprint);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
