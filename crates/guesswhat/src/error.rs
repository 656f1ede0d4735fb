//! Unified error type for the GuessWhat server.

use guesswhat_protocol::ProtocolError;
use guesswhat_room::RoomError;
use guesswhat_session::SessionError;
use guesswhat_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` conversions let `?` lift a layer's error straight into
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum GuessWhatError {
    /// Binding, accepting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session's queue or connection is gone.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room refused an operation.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The server configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}
