//! L1 local layer, statistics, and the cache core.

pub mod l1;
pub mod manager;
pub mod options;
pub mod stats;

#[cfg(test)]
mod l1_tests;

pub use l1::{L1Cache, L1Entry};
pub use manager::StrataCache;
pub use options::CacheOptions;
pub use stats::{CacheStats, StatsSnapshot};

#[cfg(any(test, feature = "mock"))]
pub use manager::MockStrataCache;
