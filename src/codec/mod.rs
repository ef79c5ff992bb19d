//! Value ↔ byte-string codec: JSON serialization composed with optional LZ4
//! compression.
//!
//! Compressed payloads are self-describing: the output is prefixed with
//! [`COMPRESSION_MARKER`] so decode can detect compression without a
//! side-channel flag. A payload that merely *starts* with the marker but is
//! not valid LZ4 decompresses unsuccessfully and falls back to raw bytes
//! (lenient mode), so legacy unmarked data never crashes a read.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{CodecError, CodecResult};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::constants::COMPRESSION_MARKER;

/// Encodes `value` into the byte string stored remotely.
///
/// With `serialize` off, a value whose JSON form is a plain string is stored
/// as its raw UTF-8 bytes (pass-through); anything else still goes through
/// JSON. With `compress` on, the output is LZ4-compressed behind the marker.
pub fn encode<T: Serialize>(value: &T, serialize: bool, compress: bool) -> CodecResult<Vec<u8>> {
    let payload = if serialize {
        serde_json::to_vec(value).map_err(|e| CodecError::SerializeFailed {
            reason: e.to_string(),
        })?
    } else {
        match serde_json::to_value(value).map_err(|e| CodecError::SerializeFailed {
            reason: e.to_string(),
        })? {
            Value::String(s) => s.into_bytes(),
            other => serde_json::to_vec(&other).map_err(|e| CodecError::SerializeFailed {
                reason: e.to_string(),
            })?,
        }
    };

    if compress {
        compress_bytes(&payload)
    } else {
        Ok(payload)
    }
}

/// Decodes a stored byte string back into a value.
///
/// Decompression is attempted iff the marker is present. In lenient mode
/// (`strict == false`) a failed decompression or deserialization degrades to
/// interpreting the payload as a raw string; strict mode surfaces the error.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], serialize: bool, strict: bool) -> CodecResult<T> {
    let raw = match strip_compression(bytes) {
        Ok(raw) => raw,
        Err(e) if strict => return Err(e),
        Err(e) => {
            warn!(error = %e, "decompression failed, treating payload as raw bytes");
            bytes.to_vec()
        }
    };

    if serialize {
        match serde_json::from_slice(&raw) {
            Ok(value) => Ok(value),
            Err(e) if strict => Err(CodecError::DeserializeFailed {
                reason: e.to_string(),
            }),
            Err(e) => {
                // Legacy payloads may be bare unquoted strings.
                warn!(error = %e, "deserialization failed, retrying payload as a bare string");
                from_raw_string(&raw)
            }
        }
    } else {
        from_raw_string(&raw)
    }
}

/// Compresses `payload` and prefixes the marker.
pub fn compress_bytes(payload: &[u8]) -> CodecResult<Vec<u8>> {
    let compressed = lz4::block::compress(payload, None, true).map_err(|e| {
        CodecError::CompressionFailed {
            reason: e.to_string(),
        }
    })?;

    let mut out = Vec::with_capacity(COMPRESSION_MARKER.len() + compressed.len());
    out.extend_from_slice(COMPRESSION_MARKER);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Removes the marker and decompresses if present; otherwise returns the
/// bytes unchanged.
pub fn strip_compression(bytes: &[u8]) -> CodecResult<Vec<u8>> {
    match bytes.strip_prefix(COMPRESSION_MARKER) {
        Some(body) => lz4::block::decompress(body, None).map_err(|e| {
            CodecError::DecompressionFailed {
                reason: e.to_string(),
            }
        }),
        None => Ok(bytes.to_vec()),
    }
}

fn from_raw_string<T: DeserializeOwned>(raw: &[u8]) -> CodecResult<T> {
    let s = String::from_utf8_lossy(raw).into_owned();
    serde_json::from_value(Value::String(s)).map_err(|e| CodecError::DeserializeFailed {
        reason: e.to_string(),
    })
}
