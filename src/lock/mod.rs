//! Distributed per-key compute lock.
//!
//! Mutual exclusion is built on the store's atomic primitives: acquisition is
//! a create-if-not-exists of `lock:<key>` holding a random token, release is
//! a compare-and-delete guarded by that token. A holder can therefore never
//! release (or be released by) anyone else, and a crashed holder's lock
//! expires with the lock TTL.


use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::constants::LOCK_KEY_PREFIX;
use crate::store::{RemoteStore, StoreResult};

/// Opaque proof of lock ownership. Only the task holding the token can
/// release the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Builds the store key guarding `key`.
pub fn lock_key(key: &str) -> String {
    format!("{LOCK_KEY_PREFIX}{key}")
}

/// Per-key mutual exclusion over a [`RemoteStore`].
pub struct LockManager<S: RemoteStore> {
    store: Arc<S>,
    lock_ttl: Duration,
    max_wait: Duration,
    poll_interval: Duration,
}

impl<S: RemoteStore> LockManager<S> {
    pub fn new(store: Arc<S>, config: &CacheConfig) -> Self {
        Self {
            store,
            lock_ttl: config.lock_ttl,
            max_wait: config.max_wait,
            poll_interval: config.poll_interval,
        }
    }

    /// Attempts to take the lock for `key`.
    ///
    /// Returns `Ok(Some(token))` if this caller won, `Ok(None)` if another
    /// holder has it. Contention is the expected outcome under concurrency,
    /// not an error.
    pub async fn acquire(&self, key: &str) -> StoreResult<Option<LockToken>> {
        let token = LockToken::fresh();
        let acquired = self
            .store
            .set_if_absent(&lock_key(key), token.as_bytes(), self.lock_ttl)
            .await?;

        if acquired {
            debug!(key, "lock acquired");
            Ok(Some(token))
        } else {
            debug!(key, "lock held elsewhere");
            Ok(None)
        }
    }

    /// Releases the lock for `key` if (and only if) `token` still holds it.
    ///
    /// Returns `false` when the lock already expired or was re-acquired by
    /// someone else; the token guard makes that a no-op rather than a theft.
    pub async fn release(&self, key: &str, token: &LockToken) -> StoreResult<bool> {
        let released = self
            .store
            .delete_if_equals(&lock_key(key), token.as_bytes())
            .await?;

        if !released {
            warn!(key, "lock was not held by this token at release");
        }
        Ok(released)
    }

    /// Polls until the lock for `key` disappears or `max_wait` elapses.
    ///
    /// Returns `true` if the lock vanished in time. A store error during
    /// polling returns `false`; the caller degrades to its fallback path
    /// rather than surfacing a store error.
    pub async fn wait_for_release(&self, key: &str) -> bool {
        let lock_key = lock_key(key);
        let deadline = Instant::now() + self.max_wait;

        loop {
            match self.store.exists(&lock_key).await {
                Ok(false) => return true,
                Ok(true) => {}
                Err(e) => {
                    warn!(key, error = %e, "store error while waiting for lock");
                    return false;
                }
            }

            if Instant::now() + self.poll_interval > deadline {
                debug!(key, "timed out waiting for lock");
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl<S: RemoteStore> std::fmt::Debug for LockManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("lock_ttl", &self.lock_ttl)
            .field("max_wait", &self.max_wait)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
