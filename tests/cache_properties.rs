//! End-to-end properties of the cache engine over the mock store.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use strata::{CacheConfig, CacheOptions, MockStore, MockStrataCache, StrataCache};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    name: String,
}

fn config() -> CacheConfig {
    CacheConfig::default().lock_wait(Duration::from_millis(500), Duration::from_millis(10))
}

fn new_cache() -> (MockStrataCache, MockStore) {
    StrataCache::new_mock(config()).expect("config should validate")
}

#[tokio::test]
async fn miss_invariant() {
    let (cache, _store) = new_cache();
    let opts = CacheOptions::default();

    for expected_misses in 1..=3 {
        assert_eq!(cache.get::<Record>("never-written", &opts).await, None);
        assert_eq!(cache.stats().misses, expected_misses);
    }
}

#[tokio::test]
async fn set_get_scenario_with_stats() {
    let (cache, _store) = new_cache();
    let opts = CacheOptions::default().ttl(Duration::from_secs(60));

    let bob = Record {
        name: "Bob".to_string(),
    };
    assert!(cache.set("user:1", &bob, &opts).await);
    assert_eq!(cache.get::<Record>("user:1", &opts).await, Some(bob));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.sets, 1);
    assert_eq!(stats.misses, 0);
}

#[tokio::test]
async fn store_outage_scenario() {
    let (cache, store) = new_cache();
    store.fail_all(true);

    // No panic, no error surfaces; absent + one counted error.
    assert_eq!(
        cache.get::<Record>("x", &CacheOptions::default()).await,
        None
    );
    assert_eq!(cache.stats().errors, 1);
}

#[tokio::test]
async fn round_trip_within_ttl() {
    let (cache, _store) = new_cache();
    let opts = CacheOptions::default().ttl(Duration::from_secs(60));

    let value = Record {
        name: "deep-equal".to_string(),
    };
    assert!(cache.set("k", &value, &opts).await);
    assert_eq!(cache.get::<Record>("k", &opts).await, Some(value));
}

#[tokio::test]
async fn entries_expire_after_ttl() {
    let (cache, _store) = new_cache();
    let opts = CacheOptions::default().ttl(Duration::from_millis(20));

    assert!(cache.set("k", &1u64, &opts).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cache.get::<u64>("k", &opts).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stampede_bound() {
    const CALLERS: usize = 16;

    let (cache, _store) = new_cache();
    let cache = Arc::new(cache);
    let factory_runs = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::with_capacity(CALLERS);
    for _ in 0..CALLERS {
        let cache = Arc::clone(&cache);
        let factory_runs = Arc::clone(&factory_runs);
        handles.push(tokio::spawn(async move {
            let runs = Arc::clone(&factory_runs);
            cache
                .get_or_set::<u64, Infallible, _, _>(
                    "expensive",
                    move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        // An expensive computation, well under the lock TTL.
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(42)
                    },
                    &CacheOptions::default(),
                )
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 42);
    }

    // Factory duration (50ms) is far below the wait bound (500ms), so the
    // losers recheck after the winner fills the cache: exactly one run.
    assert_eq!(factory_runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn tag_invalidation_completeness() {
    let (cache, _store) = new_cache();
    let tagged = CacheOptions::default().tags(["t"]);
    let untagged = CacheOptions::default();

    assert!(cache.set("k1", &1u64, &tagged).await);
    assert!(cache.set("k2", &2u64, &tagged).await);
    assert!(cache.set("k3", &3u64, &untagged).await);

    assert_eq!(cache.invalidate_by_tags(&["t"]).await, 2);

    assert_eq!(cache.get::<u64>("k1", &untagged).await, None);
    assert_eq!(cache.get::<u64>("k2", &untagged).await, None);
    assert_eq!(cache.get::<u64>("k3", &untagged).await, Some(3));
}

#[tokio::test]
async fn namespace_isolation() {
    let (cache, _store) = new_cache();
    let ns1 = CacheOptions::default().namespace("ns1");
    let ns2 = CacheOptions::default().namespace("ns2");

    assert!(cache.set("a", &1u64, &ns1).await);
    assert!(cache.set("a", &2u64, &ns2).await);

    assert!(cache.clear(Some("ns1")).await);

    assert_eq!(cache.get::<u64>("a", &ns1).await, None);
    assert_eq!(cache.get::<u64>("a", &ns2).await, Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn operations_on_different_keys_run_in_parallel() {
    let (cache, _store) = new_cache();
    let cache = Arc::new(cache);

    let mut handles = Vec::new();
    for i in 0..8u64 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            let key = format!("k{i}");
            let opts = CacheOptions::default();
            cache
                .get_or_set::<u64, Infallible, _, _>(&key, move || async move { Ok(i) }, &opts)
                .await
                .unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i as u64);
    }
}

#[tokio::test]
async fn factory_error_does_not_poison_the_key() {
    let (cache, _store) = new_cache();
    let opts = CacheOptions::default();

    let failed: Result<u64, String> = cache
        .get_or_set("k", || async { Err("boom".to_string()) }, &opts)
        .await;
    assert!(failed.is_err());

    // The lock was released; the next caller computes immediately.
    let value: Result<u64, Infallible> = cache.get_or_set("k", || async { Ok(3) }, &opts).await;
    assert_eq!(value.unwrap(), 3);
}

#[tokio::test]
async fn compression_is_transparent_across_readers() {
    let (cache, _store) = new_cache();
    let writer_opts = CacheOptions::default().compress(true);
    let reader_opts = CacheOptions::default();

    let value = "records ".repeat(1024);
    assert!(cache.set("k", &value, &writer_opts).await);

    // The marker makes compression self-describing: a reader that never
    // asked for compression still decodes.
    assert_eq!(cache.get::<String>("k", &reader_opts).await, Some(value));
}
