//! Cache core: orchestrates L1, the remote store, the codec, the lock
//! manager, and the tag index.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::l1::L1Cache;
use super::options::CacheOptions;
use super::stats::{CacheStats, StatsSnapshot};
use crate::codec;
use crate::config::{CacheConfig, ConfigError};
use crate::lock::{LockManager, LockToken};
use crate::store::RemoteStore;
use crate::tags::TagIndex;

#[cfg(any(test, feature = "mock"))]
use crate::store::MockStore;

/// Multi-layer cache over a [`RemoteStore`].
///
/// Reads check L1 first, then the remote layer (promoting hits into L1);
/// writes go through to the remote store before touching L1. `get`, `set`
/// and `delete` never take locks and never surface store errors: a broken
/// store degrades to misses and `false` returns, counted in [`StatsSnapshot`].
/// Only [`get_or_set`](Self::get_or_set) coordinates across processes, and it
/// serializes computation, not reads.
pub struct StrataCache<S: RemoteStore> {
    store: Arc<S>,
    l1: L1Cache,
    locks: LockManager<S>,
    tags: TagIndex<S>,
    stats: CacheStats,
    config: CacheConfig,
}

impl<S: RemoteStore> StrataCache<S> {
    /// Builds a cache instance over `store` after validating `config`.
    pub fn new(store: S, config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = Arc::new(store);
        let l1 = L1Cache::new(config.l1_capacity, config.l1_ttl);
        let locks = LockManager::new(Arc::clone(&store), &config);
        let tags = TagIndex::new(Arc::clone(&store));

        Ok(Self {
            store,
            l1,
            locks,
            tags,
            stats: CacheStats::new(),
            config,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the local layer, for inspection in tests and diagnostics.
    pub fn l1(&self) -> &L1Cache {
        &self.l1
    }

    /// Reads `key`, checking L1 then the remote store.
    ///
    /// A remote hit is promoted into L1 with TTL capped at
    /// `min(l1_ttl, item_ttl)`. Store failures are logged, counted, and
    /// surfaced as a plain miss; this method never errors.
    #[instrument(skip(self, opts))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str, opts: &CacheOptions) -> Option<T> {
        let full_key = self.full_key(key, opts);

        if let Some(bytes) = self.l1.lookup(&full_key) {
            match codec::decode(&bytes, opts.serialize, self.config.strict_codec) {
                Ok(value) => {
                    debug!(%full_key, "L1 hit");
                    self.stats.record_hit();
                    return Some(value);
                }
                Err(e) => {
                    warn!(%full_key, error = %e, "undecodable L1 entry, dropping");
                    self.stats.record_error();
                    self.l1.remove(&full_key);
                }
            }
        }

        match self.store.get(&full_key).await {
            Ok(Some(bytes)) => {
                match codec::decode(&bytes, opts.serialize, self.config.strict_codec) {
                    Ok(value) => {
                        debug!(%full_key, "remote hit, promoting to L1");
                        self.l1.insert(&full_key, Arc::from(bytes), opts.ttl);
                        self.stats.record_hit();
                        Some(value)
                    }
                    Err(e) => {
                        warn!(%full_key, error = %e, "undecodable remote entry");
                        self.stats.record_error();
                        None
                    }
                }
            }
            Ok(None) => {
                debug!(%full_key, "miss");
                self.stats.record_miss();
                None
            }
            Err(e) => {
                warn!(%full_key, error = %e, "store unavailable on get, treating as miss");
                self.stats.record_error();
                None
            }
        }
    }

    /// Writes `value` under `key`.
    ///
    /// Returns `true` only if the remote write succeeded; L1 is populated
    /// afterwards as a read-side optimization, never as a fallback target.
    /// Tag registration failures are counted but do not fail the write.
    #[instrument(skip(self, value, opts))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, opts: &CacheOptions) -> bool {
        let full_key = self.full_key(key, opts);
        let ttl = self.effective_ttl(opts);
        let compress = opts.compress.unwrap_or(self.config.compress);

        let bytes = match codec::encode(value, opts.serialize, compress) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%full_key, error = %e, "encode failed");
                self.stats.record_error();
                return false;
            }
        };

        if let Err(e) = self.store.set_with_ttl(&full_key, &bytes, ttl).await {
            warn!(%full_key, error = %e, "remote write failed");
            self.stats.record_error();
            return false;
        }

        self.l1.insert(&full_key, Arc::from(bytes), Some(ttl));

        if !opts.tags.is_empty() {
            if let Err(e) = self.tags.register(&full_key, &opts.tags, ttl).await {
                warn!(%full_key, error = %e, "tag registration failed");
                self.stats.record_error();
            }
        }

        self.stats.record_set();
        true
    }

    /// Deletes `key` from both layers. Returns `true` if the remote store
    /// removed it.
    #[instrument(skip(self, opts))]
    pub async fn delete(&self, key: &str, opts: &CacheOptions) -> bool {
        let full_key = self.full_key(key, opts);
        self.l1.remove(&full_key);

        match self.store.delete(&full_key).await {
            Ok(removed) => {
                if removed > 0 {
                    self.stats.record_delete();
                }
                removed > 0
            }
            Err(e) => {
                warn!(%full_key, error = %e, "remote delete failed");
                self.stats.record_error();
                false
            }
        }
    }

    /// Reads `key`, computing and caching it on a miss with stampede
    /// protection.
    ///
    /// On a miss, one caller per key wins an atomic per-key lock and runs
    /// `factory`; the others poll for the lock to vanish and then re-read.
    /// If the wait times out, the loser runs its own factory as a fallback,
    /// so worst-case latency stays bounded even when the winner stalls. The
    /// cost is duplicate computation under slow factories or lock-TTL
    /// mis-tuning.
    ///
    /// The only error this method returns is the factory's own; engine and
    /// store failures degrade to calling the factory directly.
    #[instrument(skip(self, factory, opts))]
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        factory: F,
        opts: &CacheOptions,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Common path: already cached, no locking overhead.
        if let Some(value) = self.get(key, opts).await {
            return Ok(value);
        }

        let full_key = self.full_key(key, opts);

        match self.locks.acquire(&full_key).await {
            Ok(Some(token)) => {
                // Double-check: another process may have filled the cache
                // between our miss and our lock.
                if let Some(value) = self.get(key, opts).await {
                    debug!(%full_key, "filled while acquiring lock");
                    self.release_quietly(&full_key, &token).await;
                    return Ok(value);
                }

                info!(%full_key, "computing value under lock");
                match factory().await {
                    Ok(value) => {
                        self.set(key, &value, opts).await;
                        self.release_quietly(&full_key, &token).await;
                        Ok(value)
                    }
                    Err(e) => {
                        // Release before propagating, or every competitor
                        // blocks until the lock TTL expires.
                        self.release_quietly(&full_key, &token).await;
                        Err(e)
                    }
                }
            }
            Ok(None) => {
                debug!(%full_key, "lock contended, waiting for holder");
                if self.locks.wait_for_release(&full_key).await
                    && let Some(value) = self.get(key, opts).await
                {
                    return Ok(value);
                }

                // Timed out, or the holder failed to fill the cache. Compute
                // directly without writing back, so a duplicate result never
                // clobbers the winner's write racing this path.
                info!(%full_key, "lock wait exhausted, computing fallback");
                factory().await
            }
            Err(e) => {
                warn!(%full_key, error = %e, "store unavailable for locking, computing directly");
                self.stats.record_error();
                factory().await
            }
        }
    }

    /// Deletes every entry registered under any of `tags`, then the tag sets
    /// themselves. Returns how many member keys were actually deleted.
    ///
    /// Known race: a member re-created between the member fetch and the
    /// delete is lost. Tag membership never guarantees the entry still
    /// exists; dangling members count as zero.
    #[instrument(skip(self))]
    pub async fn invalidate_by_tags(&self, tags: &[&str]) -> u64 {
        // Member sets are independent; fetch them in one concurrent sweep.
        let fetches = join_all(tags.iter().map(|tag| self.tags.members(tag)));
        let mut deleted = 0;

        for (tag, fetched) in tags.iter().zip(fetches.await) {
            let members = match fetched {
                Ok(members) => members,
                Err(e) => {
                    warn!(%tag, error = %e, "could not read tag set");
                    self.stats.record_error();
                    continue;
                }
            };

            if !members.is_empty() {
                match self.store.delete_many(&members).await {
                    Ok(removed) => {
                        for key in &members {
                            self.l1.remove(key);
                        }
                        deleted += removed;
                    }
                    Err(e) => {
                        warn!(%tag, error = %e, "batched delete failed");
                        self.stats.record_error();
                        continue;
                    }
                }
            }

            if let Err(e) = self.tags.clear(tag).await {
                warn!(%tag, error = %e, "could not delete tag set");
                self.stats.record_error();
            }
        }

        info!(?tags, deleted, "tag invalidation complete");
        deleted
    }

    /// Clears a namespace, or the whole store.
    ///
    /// With a namespace: prefix-scan the remote store, delete the matches,
    /// and purge the same prefix from L1. Without one: flush the remote
    /// store and drop all of L1. That path is destructive and not tenant-scoped;
    /// multi-tenant deployments should always pass a namespace.
    #[instrument(skip(self))]
    pub async fn clear(&self, namespace: Option<&str>) -> bool {
        match namespace {
            Some(ns) => {
                let prefix = format!("{ns}:");
                match self.store.scan_prefix(&prefix).await {
                    Ok(keys) => {
                        if !keys.is_empty()
                            && let Err(e) = self.store.delete_many(&keys).await
                        {
                            warn!(ns, error = %e, "namespace delete failed");
                            self.stats.record_error();
                            return false;
                        }
                        self.l1.purge_prefix(&prefix);
                        info!(ns, keys = keys.len(), "namespace cleared");
                        true
                    }
                    Err(e) => {
                        warn!(ns, error = %e, "namespace scan failed");
                        self.stats.record_error();
                        false
                    }
                }
            }
            None => match self.store.flush_all().await {
                Ok(()) => {
                    self.l1.clear();
                    info!("full cache flush");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "full flush failed");
                    self.stats.record_error();
                    false
                }
            },
        }
    }

    /// Returns a snapshot of this instance's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Zeroes this instance's counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Composes the full key: options namespace, else configured namespace,
    /// else the bare key.
    fn full_key(&self, key: &str, opts: &CacheOptions) -> String {
        let namespace = opts
            .namespace
            .as_deref()
            .or(self.config.namespace.as_deref());
        match namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }

    /// Resolves the remote TTL: explicit non-zero option, else the default.
    fn effective_ttl(&self, opts: &CacheOptions) -> Duration {
        opts.ttl
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.config.default_ttl)
    }

    /// Releases a lock, absorbing store errors (the caller is about to
    /// return a value or a factory error, never a store error).
    async fn release_quietly(&self, full_key: &str, token: &LockToken) {
        if let Err(e) = self.locks.release(full_key, token).await {
            warn!(%full_key, error = %e, "lock release failed, TTL will reclaim it");
            self.stats.record_error();
        }
    }
}

impl<S: RemoteStore> std::fmt::Debug for StrataCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrataCache")
            .field("l1", &self.l1)
            .field("locks", &self.locks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(any(test, feature = "mock"))]
/// Cache over the in-memory mock store.
pub type MockStrataCache = StrataCache<MockStore>;

#[cfg(any(test, feature = "mock"))]
impl StrataCache<MockStore> {
    /// Builds a cache over a fresh [`MockStore`] with the given config.
    pub fn new_mock(config: CacheConfig) -> Result<(Self, MockStore), ConfigError> {
        let store = MockStore::new();
        let cache = Self::new(store.clone(), config)?;
        Ok((cache, store))
    }
}
