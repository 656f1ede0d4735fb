//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// None of these ever reach a player: the router drops envelopes that fail
/// to decode, and encode failures are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into JSON text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing `type`, wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope parsed but its `type` is not one the server consumes.
    #[error("unknown message type: {0}")]
    UnknownType(String),
}
