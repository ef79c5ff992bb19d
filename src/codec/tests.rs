use serde::{Deserialize, Serialize};

use super::*;
use crate::constants::COMPRESSION_MARKER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    id: u64,
    name: String,
    active: bool,
}

fn sample() -> Record {
    Record {
        id: 42,
        name: "Bob".to_string(),
        active: true,
    }
}

#[test]
fn test_struct_round_trip() {
    let encoded = encode(&sample(), true, false).unwrap();
    let decoded: Record = decode(&encoded, true, false).unwrap();
    assert_eq!(decoded, sample());
}

#[test]
fn test_struct_round_trip_compressed() {
    let encoded = encode(&sample(), true, true).unwrap();
    assert!(encoded.starts_with(COMPRESSION_MARKER));

    let decoded: Record = decode(&encoded, true, false).unwrap();
    assert_eq!(decoded, sample());
}

#[test]
fn test_raw_string_pass_through() {
    let encoded = encode(&"plain text", false, false).unwrap();
    // No JSON quoting when serialization is opted out.
    assert_eq!(encoded, b"plain text");

    let decoded: String = decode(&encoded, false, false).unwrap();
    assert_eq!(decoded, "plain text");
}

#[test]
fn test_compressed_output_is_smaller_for_repetitive_data() {
    let value = "a".repeat(4096);
    let plain = encode(&value, true, false).unwrap();
    let compressed = encode(&value, true, true).unwrap();
    assert!(compressed.len() < plain.len());
}

#[test]
fn test_marker_prefixed_payload_round_trips() {
    // A payload that already begins with the marker must survive
    // compress → decompress unchanged.
    let mut payload = COMPRESSION_MARKER.to_vec();
    payload.extend_from_slice(b"not actually compressed");

    let compressed = compress_bytes(&payload).unwrap();
    let restored = strip_compression(&compressed).unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn test_unmarked_bytes_pass_through_strip() {
    let bytes = b"legacy payload".to_vec();
    assert_eq!(strip_compression(&bytes).unwrap(), bytes);
}

#[test]
fn test_corrupt_marker_payload_falls_back_lenient() {
    // Starts with the marker but is not valid LZ4. Lenient decode must not
    // error; the payload is reinterpreted as a raw string.
    let mut bytes = COMPRESSION_MARKER.to_vec();
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(b"garbage");

    let decoded: String = decode(&bytes, false, false).unwrap();
    assert_eq!(decoded.as_bytes(), bytes.as_slice());
}

#[test]
fn test_corrupt_marker_payload_errors_strict() {
    let mut bytes = COMPRESSION_MARKER.to_vec();
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(b"garbage");

    let result: CodecResult<String> = decode(&bytes, false, true);
    assert!(matches!(
        result,
        Err(CodecError::DecompressionFailed { .. })
    ));
}

#[test]
fn test_malformed_json_errors_strict() {
    let result: CodecResult<Record> = decode(b"{not json", true, true);
    assert!(matches!(result, Err(CodecError::DeserializeFailed { .. })));
}

#[test]
fn test_malformed_json_falls_back_to_string_lenient() {
    // The bare-string fallback only helps when the caller wants a string.
    let decoded: String = decode(b"not json at all", true, false).unwrap();
    assert_eq!(decoded, "not json at all");
}
