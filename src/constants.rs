//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary values (e.g. composed key prefixes) from these
//! rather than re-stating literals at call sites.

use std::time::Duration;

/// Prefix for distributed lock keys (`lock:<full_key>`).
pub const LOCK_KEY_PREFIX: &str = "lock:";

/// Prefix for tag-set keys (`tag:<tag_name>`).
pub const TAG_KEY_PREFIX: &str = "tag:";

/// Marker prepended to compressed payloads so decode can self-detect
/// compression without a side-channel flag.
pub const COMPRESSION_MARKER: &[u8] = b"LZ4:";

/// Default max entries in the L1 layer.
pub const DEFAULT_L1_CAPACITY: u64 = 10_000;

/// Default TTL for L1 entries. Individual inserts are capped at
/// `min(l1_ttl, item_ttl)` so L1 never outlives the remote value.
pub const DEFAULT_L1_TTL: Duration = Duration::from_secs(60);

/// Default TTL for remote entries when the caller supplies none.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(300);

/// Default TTL on the per-key compute lock. Acts as the circuit-breaker
/// against a crashed lock holder.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(30);

/// Default upper bound on how long a `get_or_set` loser waits for the
/// winner's lock to disappear before computing on its own.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(5_000);

/// Default interval between lock-disappearance polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Slack added to a tag set's TTL on top of the entry TTL it indexes, so the
/// index outlives the entries it references.
pub const TAG_TTL_SLACK: Duration = Duration::from_secs(60);
