//! Store-backed tag index for bulk invalidation.
//!
//! Each tag lives at `tag:<name>` holding a JSON array of the full cache keys
//! written under it. The set carries its own TTL (entry TTL plus slack) so it
//! outlives the entries it references, and membership never guarantees the
//! referenced entry still exists; TTL or an explicit delete can remove the
//! entry first, so invalidation tolerates dangling members.
//!
//! The store contract has no native set type, so registration is a
//! read-modify-write of the JSON array. Concurrent registrations on the same
//! tag can race (last writer wins); callers needing stronger guarantees must
//! serialize writes to tagged keys externally.


use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::constants::{TAG_KEY_PREFIX, TAG_TTL_SLACK};
use crate::store::{RemoteStore, StoreResult};

/// Builds the store key for a tag set.
pub fn tag_key(tag: &str) -> String {
    format!("{TAG_KEY_PREFIX}{tag}")
}

/// Tag-name → member-key mapping over a [`RemoteStore`].
pub struct TagIndex<S: RemoteStore> {
    store: Arc<S>,
}

impl<S: RemoteStore> TagIndex<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds `key` to each tag's member set, refreshing the set TTL to
    /// `entry_ttl` plus slack.
    pub async fn register(
        &self,
        key: &str,
        tags: &[String],
        entry_ttl: Duration,
    ) -> StoreResult<()> {
        let set_ttl = entry_ttl + TAG_TTL_SLACK;

        for tag in tags {
            let tag_key = tag_key(tag);
            let mut members = match self.store.get(&tag_key).await? {
                Some(bytes) => decode_members(&tag_key, &bytes),
                None => Vec::new(),
            };

            if !members.iter().any(|m| m == key) {
                members.push(key.to_string());
            }

            let encoded = serde_json::to_vec(&members).unwrap_or_default();
            self.store.set_with_ttl(&tag_key, &encoded, set_ttl).await?;
        }

        Ok(())
    }

    /// Returns the member keys recorded under `tag` (possibly dangling).
    pub async fn members(&self, tag: &str) -> StoreResult<Vec<String>> {
        let tag_key = tag_key(tag);
        match self.store.get(&tag_key).await? {
            Some(bytes) => Ok(decode_members(&tag_key, &bytes)),
            None => Ok(Vec::new()),
        }
    }

    /// Deletes the tag set itself (not its members).
    pub async fn clear(&self, tag: &str) -> StoreResult<()> {
        self.store.delete(&tag_key(tag)).await?;
        Ok(())
    }
}

impl<S: RemoteStore> std::fmt::Debug for TagIndex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagIndex").finish_non_exhaustive()
    }
}

fn decode_members(tag_key: &str, bytes: &[u8]) -> Vec<String> {
    match serde_json::from_slice(bytes) {
        Ok(members) => members,
        Err(e) => {
            // A corrupt set loses its members rather than wedging every
            // write to the tag.
            warn!(tag_key, error = %e, "corrupt tag set, starting fresh");
            Vec::new()
        }
    }
}
