//! L1 process-local layer (in-memory).
//!
//! Holds the encoded bytes exactly as the remote store does, so promotion and
//! write-through share one representation. Expiry is checked lazily on read
//! (no background sweeper); moka's capacity bound keeps cold dead entries
//! from pinning memory forever.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;

/// One L1 entry: encoded value plus its local expiry.
#[derive(Clone)]
pub struct L1Entry {
    value: Arc<[u8]>,
    expires_at: Instant,
}

impl L1Entry {
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl std::fmt::Debug for L1Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Entry")
            .field("len", &self.value.len())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// In-memory byte cache keyed by full composed key.
pub struct L1Cache {
    entries: Cache<String, L1Entry>,
    default_ttl: Duration,
}

impl L1Cache {
    /// Creates a cache bounded at `capacity` entries with the given default
    /// entry TTL.
    pub fn new(capacity: u64, default_ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
            default_ttl,
        }
    }

    /// Looks up `key`, dropping the entry if its TTL has lapsed.
    pub fn lookup(&self, key: &str) -> Option<Arc<[u8]>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            // Lazy expiry: evict on the read that discovers it.
            self.entries.invalidate(key);
            return None;
        }
        Some(Arc::clone(&entry.value))
    }

    /// Inserts `value` under `key`.
    ///
    /// The entry's lifetime is `min(default_ttl, item_ttl)`: L1 must never
    /// outlive the remote value it shadows.
    pub fn insert(&self, key: &str, value: Arc<[u8]>, item_ttl: Option<Duration>) {
        let ttl = match item_ttl {
            Some(t) if !t.is_zero() => t.min(self.default_ttl),
            _ => self.default_ttl,
        };
        self.entries.insert(
            key.to_string(),
            L1Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Removes `key`; returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn purge_prefix(&self, prefix: &str) {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        for key in doomed {
            self.entries.invalidate(&key);
        }
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Returns `true` if `key` is present and unexpired.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of resident entries (may include not-yet-swept expired ones).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for L1Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Cache")
            .field("entries", &self.entries.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
