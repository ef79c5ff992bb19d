//! Remote key-value store contract and implementations.
//!
//! The cache core is store-agnostic: everything it needs from the shared
//! layer is expressed by [`RemoteStore`]. [`RedisStore`] is the production
//! implementation; [`MockStore`] (behind the `mock` feature) backs tests.

pub mod error;
pub mod redis;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::{StoreError, StoreResult};
pub use self::redis::RedisStore;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockStore;

use std::time::Duration;

/// Contract a networked key-value store must satisfy to back the cache.
///
/// All methods are suspension points. Atomicity is only required where the
/// signature implies it: [`set_if_absent`](RemoteStore::set_if_absent) is an
/// atomic create-if-not-exists and
/// [`delete_if_equals`](RemoteStore::delete_if_equals) is an atomic
/// compare-and-delete; both underpin the distributed lock.
pub trait RemoteStore: Send + Sync {
    /// Fetches the raw bytes stored at `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<Vec<u8>>>> + Send;

    /// Stores `value` at `key` with a native TTL.
    fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Deletes `key`; returns how many keys were removed (0 or 1).
    fn delete(&self, key: &str) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Returns `true` if `key` currently exists.
    fn exists(&self, key: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Lists every key beginning with `prefix`.
    fn scan_prefix(&self, prefix: &str) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Atomically stores `value` at `key` with `ttl` only if `key` does not
    /// exist. Returns `true` if the write happened.
    fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Atomically deletes `key` only if its current value equals `expected`.
    /// Returns `true` if the key was deleted.
    fn delete_if_equals(
        &self,
        key: &str,
        expected: &[u8],
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Deletes a batch of keys in one round trip where the store supports
    /// pipelining; returns the number of keys removed.
    fn delete_many(&self, keys: &[String]) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Removes every key in the store. Destructive; only reached through
    /// [`clear`](crate::cache::StrataCache::clear) without a namespace.
    fn flush_all(&self) -> impl Future<Output = StoreResult<()>> + Send;
}
