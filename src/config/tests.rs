use super::*;
use serial_test::serial;
use std::env;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_strata_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("STRATA_NAMESPACE");
        env::remove_var("STRATA_L1_CAPACITY");
        env::remove_var("STRATA_L1_TTL_SECS");
        env::remove_var("STRATA_DEFAULT_TTL_SECS");
        env::remove_var("STRATA_LOCK_TTL_SECS");
        env::remove_var("STRATA_MAX_WAIT_MS");
        env::remove_var("STRATA_POLL_INTERVAL_MS");
        env::remove_var("STRATA_COMPRESS");
        env::remove_var("STRATA_STRICT_CODEC");
    }
}

#[test]
fn test_default_config() {
    let config = CacheConfig::default();

    assert!(config.namespace.is_none());
    assert_eq!(config.l1_capacity, 10_000);
    assert_eq!(config.l1_ttl, Duration::from_secs(60));
    assert_eq!(config.default_ttl, Duration::from_secs(300));
    assert_eq!(config.lock_ttl, Duration::from_secs(30));
    assert_eq!(config.max_wait, Duration::from_millis(5_000));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert!(!config.compress);
    assert!(!config.strict_codec);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_strata_env();

    let config = CacheConfig::from_env().expect("defaults should load");
    assert_eq!(config.l1_capacity, 10_000);
    assert!(config.namespace.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_strata_env();

    let config = with_env_vars(
        &[
            ("STRATA_NAMESPACE", "emr"),
            ("STRATA_L1_CAPACITY", "500"),
            ("STRATA_DEFAULT_TTL_SECS", "120"),
            ("STRATA_MAX_WAIT_MS", "2000"),
            ("STRATA_COMPRESS", "true"),
        ],
        || CacheConfig::from_env().expect("overrides should parse"),
    );

    assert_eq!(config.namespace.as_deref(), Some("emr"));
    assert_eq!(config.l1_capacity, 500);
    assert_eq!(config.default_ttl, Duration::from_secs(120));
    assert_eq!(config.max_wait, Duration::from_millis(2000));
    assert!(config.compress);
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_strata_env();

    let result = with_env_vars(&[("STRATA_L1_CAPACITY", "lots")], CacheConfig::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvValue { var, .. }) if var == "STRATA_L1_CAPACITY"
    ));

    let result = with_env_vars(&[("STRATA_COMPRESS", "maybe")], CacheConfig::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidEnvValue { .. })));
}

#[test]
fn test_validate_rejects_zero_lock_ttl() {
    let config = CacheConfig {
        lock_ttl: Duration::ZERO,
        ..CacheConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_poll_longer_than_wait() {
    let config = CacheConfig::default().lock_wait(
        Duration::from_millis(100),
        Duration::from_millis(500),
    );
    assert!(config.validate().is_err());
}

#[test]
fn test_builder_methods() {
    let config = CacheConfig::default()
        .namespace("records")
        .default_ttl(Duration::from_secs(30))
        .lock_ttl(Duration::from_secs(10))
        .compress(true)
        .strict_codec(true);

    assert_eq!(config.namespace.as_deref(), Some("records"));
    assert_eq!(config.default_ttl, Duration::from_secs(30));
    assert_eq!(config.lock_ttl, Duration::from_secs(10));
    assert!(config.compress);
    assert!(config.strict_codec);
}
