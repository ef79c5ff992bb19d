//! Multi-layer cache engine with stampede protection and tag-based
//! invalidation.
//!
//! A process-local L1 layer ([`L1Cache`]) sits in front of a shared remote
//! key-value store ([`RemoteStore`], typically [`RedisStore`]). Reads check
//! L1, then the remote layer, promoting remote hits into L1; writes go
//! through the remote store first. [`StrataCache::get_or_set`] bounds
//! concurrent recomputation of the same key with a distributed per-key lock,
//! and entries written with tags can be bulk-invalidated without enumerating
//! keys.
//!
//! The engine degrades rather than fails: a broken store turns reads into
//! misses and writes into `false` returns, all visible through
//! [`StatsSnapshot`]. Callers of [`StrataCache::get_or_set`] only ever see
//! errors thrown by their own factory.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use strata::{CacheConfig, CacheOptions, RedisStore, StrataCache};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisStore::connect("redis://127.0.0.1/").await?;
//! let cache = StrataCache::new(store, CacheConfig::default().namespace("emr"))?;
//!
//! let opts = CacheOptions::default()
//!     .ttl(Duration::from_secs(60))
//!     .tags(["patient:1"]);
//!
//! let record: String = cache
//!     .get_or_set("record:1", || async { load_record(1).await }, &opts)
//!     .await?;
//!
//! cache.invalidate_by_tags(&["patient:1"]).await;
//! # Ok(())
//! # }
//! # async fn load_record(_id: u64) -> Result<String, Box<dyn std::error::Error>> { Ok(String::new()) }
//! ```
//!
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod codec;
pub mod config;
pub mod constants;
pub mod lock;
pub mod store;
pub mod tags;

pub use cache::{CacheOptions, CacheStats, L1Cache, L1Entry, StatsSnapshot, StrataCache};
pub use codec::{CodecError, CodecResult};
pub use config::{CacheConfig, ConfigError};
pub use lock::{LockManager, LockToken};
pub use store::{RedisStore, RemoteStore, StoreError, StoreResult};
pub use tags::TagIndex;

#[cfg(any(test, feature = "mock"))]
pub use cache::MockStrataCache;
#[cfg(any(test, feature = "mock"))]
pub use store::MockStore;
