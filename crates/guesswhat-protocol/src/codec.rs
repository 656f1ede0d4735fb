//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust values and the text carried by one
//! transport frame. The router and the session writer only talk to the
//! [`Codec`] trait, so the framing could change without touching them.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values into frame text and decodes frame text back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task and writer pump.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into the text of one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes the text of one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or does
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`), the only format the
/// browser client speaks.
///
/// ```rust
/// use guesswhat_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let text = codec.encode(&Envelope::new("info", "hello")).unwrap();
/// assert_eq!(text, r#"{"type":"info","content":"hello"}"#);
///
/// let back: Envelope = codec.decode(&text).unwrap();
/// assert_eq!(back.content, "hello");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
