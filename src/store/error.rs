//! Remote store error types.

use thiserror::Error;

/// Errors surfaced by a [`RemoteStore`](super::RemoteStore) implementation.
///
/// The cache core treats every variant as "store unavailable": recovered
/// locally, counted, and never re-raised to callers of `get`/`set`/`delete`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the store (connect/timeout/broken connection).
    #[error("store connection failed: {message}")]
    Connection { message: String },

    /// The store rejected or failed a command.
    #[error("store command failed: {message}")]
    Command { message: String },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() {
            StoreError::Connection {
                message: e.to_string(),
            }
        } else {
            StoreError::Command {
                message: e.to_string(),
            }
        }
    }
}
