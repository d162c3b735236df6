//! Error types for the protocol layer.
//!
//! Each crate in Tempo defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in serialization or in the
//! shape of a value, not in storage or room coordination.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a corrupted roster blob, missing required fields,
    /// or a blob written by an incompatible version.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
