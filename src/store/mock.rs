//! Mock in-memory [`RemoteStore`] for tests.
//!
//! Honors the same semantics as the Redis store (per-key expiry, atomic
//! set-if-absent, compare-and-delete) and adds a fail switch that makes
//! every call return a connection error, for outage-path tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::RemoteStore;
use super::error::{StoreError, StoreResult};

#[derive(Clone)]
struct MockEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MockEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Default, Clone)]
/// In-memory store with real TTL and CAS semantics.
pub struct MockStore {
    entries: Arc<RwLock<HashMap<String, MockEntry>>>,
    fail_all: Arc<AtomicBool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every store call fails with a connection error.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present and unexpired. Test helper that
    /// bypasses the fail switch.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|e| !e.is_expired())
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(StoreError::Connection {
                message: "mock store offline".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn read_live(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone())
    }
}

impl RemoteStore for MockStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self.read_live(key))
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        self.check_available()?;
        self.entries.write().insert(
            key.to_string(),
            MockEntry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        self.check_available()?;
        let removed = self.entries.write().remove(key);
        Ok(removed.filter(|e| !e.is_expired()).map_or(0, |_| 1))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.check_available()?;
        Ok(self.read_live(key).is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && !e.is_expired())
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<bool> {
        self.check_available()?;
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(existing) if !existing.is_expired() => Ok(false),
            _ => {
                entries.insert(
                    key.to_string(),
                    MockEntry {
                        value: value.to_vec(),
                        expires_at: Instant::now() + ttl,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn delete_if_equals(&self, key: &str, expected: &[u8]) -> StoreResult<bool> {
        self.check_available()?;
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(existing) if !existing.is_expired() && existing.value == expected => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        self.check_available()?;
        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if entries.remove(key).is_some_and(|e| !e.is_expired()) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        self.check_available()?;
        self.entries.write().clear();
        Ok(())
    }
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("entries", &self.entries.read().len())
            .field("fail_all", &self.fail_all.load(Ordering::SeqCst))
            .finish()
    }
}
