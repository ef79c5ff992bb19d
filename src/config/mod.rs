//! Cache configuration.
//!
//! [`CacheConfig`] is passed explicitly at construction; nothing reads the
//! environment on the hot path. [`CacheConfig::from_env`] exists for service
//! wiring and reads `STRATA_*` overrides on top of defaults.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ENTRY_TTL, DEFAULT_L1_CAPACITY, DEFAULT_L1_TTL, DEFAULT_LOCK_TTL, DEFAULT_MAX_WAIT,
    DEFAULT_POLL_INTERVAL,
};

/// Tunables for one cache instance.
///
/// Every knob the engine consults is enumerated here; constructing two
/// instances with different configs (e.g. per tenant) is supported and each
/// instance owns its own statistics.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default key prefix applied when a call supplies no namespace.
    pub namespace: Option<String>,

    /// Max entries held in the L1 layer. Default: `10_000`.
    pub l1_capacity: u64,

    /// Default lifetime of an L1 entry. Individual entries are capped at
    /// `min(l1_ttl, item_ttl)`. Default: 60s.
    pub l1_ttl: Duration,

    /// Remote-store TTL used when the caller supplies none (or supplies a
    /// zero duration, which is treated as "use default"). Default: 300s.
    pub default_ttl: Duration,

    /// TTL on the per-key compute lock. Default: 30s.
    pub lock_ttl: Duration,

    /// Upper bound on the lock-polling wait in `get_or_set`. Default: 5s.
    pub max_wait: Duration,

    /// Interval between lock polls. Default: 100ms.
    pub poll_interval: Duration,

    /// Compress payloads by default (per-call override via options).
    /// Default: `false`.
    pub compress: bool,

    /// When set, codec failures are not silently degraded to raw-bytes
    /// passthrough; the read is logged, counted as an error and misses.
    /// Default: `false` (availability over strictness).
    pub strict_codec: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            l1_capacity: DEFAULT_L1_CAPACITY,
            l1_ttl: DEFAULT_L1_TTL,
            default_ttl: DEFAULT_ENTRY_TTL,
            lock_ttl: DEFAULT_LOCK_TTL,
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            compress: false,
            strict_codec: false,
        }
    }
}

impl CacheConfig {
    const ENV_NAMESPACE: &'static str = "STRATA_NAMESPACE";
    const ENV_L1_CAPACITY: &'static str = "STRATA_L1_CAPACITY";
    const ENV_L1_TTL_SECS: &'static str = "STRATA_L1_TTL_SECS";
    const ENV_DEFAULT_TTL_SECS: &'static str = "STRATA_DEFAULT_TTL_SECS";
    const ENV_LOCK_TTL_SECS: &'static str = "STRATA_LOCK_TTL_SECS";
    const ENV_MAX_WAIT_MS: &'static str = "STRATA_MAX_WAIT_MS";
    const ENV_POLL_INTERVAL_MS: &'static str = "STRATA_POLL_INTERVAL_MS";
    const ENV_COMPRESS: &'static str = "STRATA_COMPRESS";
    const ENV_STRICT_CODEC: &'static str = "STRATA_STRICT_CODEC";

    /// Loads configuration from `STRATA_*` environment variables, falling
    /// back to defaults, then validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            namespace: env::var(Self::ENV_NAMESPACE).ok().filter(|s| !s.is_empty()),
            l1_capacity: Self::parse_u64(Self::ENV_L1_CAPACITY, defaults.l1_capacity)?,
            l1_ttl: Self::parse_secs(Self::ENV_L1_TTL_SECS, defaults.l1_ttl)?,
            default_ttl: Self::parse_secs(Self::ENV_DEFAULT_TTL_SECS, defaults.default_ttl)?,
            lock_ttl: Self::parse_secs(Self::ENV_LOCK_TTL_SECS, defaults.lock_ttl)?,
            max_wait: Self::parse_millis(Self::ENV_MAX_WAIT_MS, defaults.max_wait)?,
            poll_interval: Self::parse_millis(Self::ENV_POLL_INTERVAL_MS, defaults.poll_interval)?,
            compress: Self::parse_bool(Self::ENV_COMPRESS, defaults.compress)?,
            strict_codec: Self::parse_bool(Self::ENV_STRICT_CODEC, defaults.strict_codec)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Sets the default namespace.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Sets the default remote-entry TTL.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the L1 entry TTL.
    pub fn l1_ttl(mut self, ttl: Duration) -> Self {
        self.l1_ttl = ttl;
        self
    }

    /// Sets the compute-lock TTL.
    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    /// Sets the lock-wait bound and poll interval.
    pub fn lock_wait(mut self, max_wait: Duration, poll_interval: Duration) -> Self {
        self.max_wait = max_wait;
        self.poll_interval = poll_interval;
        self
    }

    /// Enables compression by default.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enables strict codec mode.
    pub fn strict_codec(mut self, strict: bool) -> Self {
        self.strict_codec = strict;
        self
    }

    /// Checks internal consistency of the tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                reason: "default_ttl must be > 0".to_string(),
            });
        }
        if self.l1_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                reason: "l1_ttl must be > 0".to_string(),
            });
        }
        if self.lock_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                reason: "lock_ttl must be > 0".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                reason: "poll_interval must be > 0".to_string(),
            });
        }
        if self.poll_interval > self.max_wait {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "poll_interval ({:?}) cannot exceed max_wait ({:?})",
                    self.poll_interval, self.max_wait
                ),
            });
        }
        Ok(())
    }

    fn parse_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(var) {
            Ok(value) => value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvValue {
                    var,
                    value,
                    reason: e.to_string(),
                }
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_secs(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Ok(Duration::from_secs(Self::parse_u64(
            var,
            default.as_secs(),
        )?))
    }

    fn parse_millis(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Ok(Duration::from_millis(Self::parse_u64(
            var,
            default.as_millis() as u64,
        )?))
    }

    fn parse_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var) {
            Ok(value) => match value.as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidEnvValue {
                    var,
                    value,
                    reason: "expected one of 1/0/true/false/yes/no".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
