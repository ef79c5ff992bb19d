//! Codec error types.

use thiserror::Error;

/// Errors from the encode/decode pipeline.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Value could not be serialized to bytes.
    #[error("serialization failed: {reason}")]
    SerializeFailed { reason: String },

    /// Bytes could not be deserialized into the requested type.
    #[error("deserialization failed: {reason}")]
    DeserializeFailed { reason: String },

    /// LZ4 compression failed.
    #[error("compression failed: {reason}")]
    CompressionFailed { reason: String },

    /// LZ4 decompression failed (strict mode only; otherwise the payload is
    /// passed through as raw bytes).
    #[error("decompression failed: {reason}")]
    DecompressionFailed { reason: String },
}

/// Convenience result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
