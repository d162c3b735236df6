//! Codec trait and implementations for structured blobs.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Tempo stores a room's member roster as one opaque blob next to the
//! room record, so the roster travels through storage in a single write.
//! Storage doesn't care HOW the blob is encoded; only the room layer
//! reads it, through whatever implements [`Codec`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the room layer shares one codec across
/// every concurrently running operation.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON keeps stored rosters human-readable, which makes inspecting a
/// room row by hand easy. Optional fields marked
/// `skip_serializing_if = "Option::is_none"` are left out of the blob
/// entirely, so "absent" stays distinguishable from any stored value.
///
/// ```rust
/// use tempo_protocol::{Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&vec![RoomId(1), RoomId(2)]).unwrap();
/// let decoded: Vec<RoomId> = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, vec![RoomId(1), RoomId(2)]);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<i64>,
    }

    #[test]
    fn test_encode_omits_absent_optional_fields() {
        let bytes = JsonCodec.encode(&Entry { id: 1, score: None }).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["id"], 1);
        assert!(json.get("score").is_none(), "absent field must not be written");
    }

    #[test]
    fn test_decode_missing_optional_field_is_none() {
        let entry: Entry = JsonCodec.decode(br#"{"id": 4}"#).unwrap();
        assert_eq!(entry, Entry { id: 4, score: None });
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<Entry, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
