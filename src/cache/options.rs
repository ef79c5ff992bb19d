//! Per-call cache options.

use std::time::Duration;

/// Options accepted by every cache operation.
///
/// All fields have sensible zero-cost defaults; construct with
/// [`CacheOptions::default`] and chain the builder methods as needed.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Remote-entry TTL. `None` (or a zero duration) means the configured
    /// default; there is no "infinite" TTL.
    pub ttl: Option<Duration>,

    /// Key prefix for this call, overriding the configured default namespace.
    pub namespace: Option<String>,

    /// Tags to register the key under at write time, enabling bulk
    /// invalidation without enumerating keys.
    pub tags: Vec<String>,

    /// Per-call compression override; `None` means the configured default.
    pub compress: Option<bool>,

    /// When `false`, string values pass through as raw UTF-8 bytes instead
    /// of JSON.
    pub serialize: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            namespace: None,
            tags: Vec::new(),
            compress: None,
            serialize: true,
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    /// Opts out of JSON serialization (raw string pass-through).
    pub fn raw(mut self) -> Self {
        self.serialize = false;
        self
    }
}
