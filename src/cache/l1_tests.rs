use std::sync::Arc;
use std::time::Duration;

use super::l1::L1Cache;

fn bytes(s: &str) -> Arc<[u8]> {
    Arc::from(s.as_bytes().to_vec())
}

#[test]
fn test_lookup_absent_returns_none() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_insert_then_lookup() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("k", bytes("v"), None);

    let value = cache.lookup("k").expect("entry should be present");
    assert_eq!(&*value, b"v");
    assert!(cache.contains("k"));
}

#[test]
fn test_lazy_expiry_on_read() {
    let cache = L1Cache::new(100, Duration::from_millis(10));
    cache.insert("k", bytes("v"), None);

    std::thread::sleep(Duration::from_millis(30));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_item_ttl_caps_below_default() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    // Item TTL shorter than the layer default wins.
    cache.insert("k", bytes("v"), Some(Duration::from_millis(10)));

    std::thread::sleep(Duration::from_millis(30));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_default_ttl_caps_long_item_ttl() {
    let cache = L1Cache::new(100, Duration::from_millis(10));
    // An item TTL longer than the layer default must not extend L1 life.
    cache.insert("k", bytes("v"), Some(Duration::from_secs(3600)));

    std::thread::sleep(Duration::from_millis(30));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_zero_item_ttl_falls_back_to_default() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("k", bytes("v"), Some(Duration::ZERO));
    assert!(cache.lookup("k").is_some());
}

#[test]
fn test_remove() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("k", bytes("v"), None);

    assert!(cache.remove("k"));
    assert!(!cache.remove("k"));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_purge_prefix_is_scoped() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("ns1:a", bytes("1"), None);
    cache.insert("ns1:b", bytes("2"), None);
    cache.insert("ns2:a", bytes("3"), None);

    cache.purge_prefix("ns1:");

    assert!(cache.lookup("ns1:a").is_none());
    assert!(cache.lookup("ns1:b").is_none());
    assert!(cache.lookup("ns2:a").is_some());
}

#[test]
fn test_clear() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("a", bytes("1"), None);
    cache.insert("b", bytes("2"), None);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_overwrite_replaces_value() {
    let cache = L1Cache::new(100, Duration::from_secs(60));
    cache.insert("k", bytes("old"), None);
    cache.insert("k", bytes("new"), None);

    assert_eq!(&*cache.lookup("k").unwrap(), b"new");
}
