//! Error types for the session layer.

use guesswhat_transport::{ConnectionId, TransportError};

/// Errors that can occur while driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The outbound queue is gone: the writer pump has stopped because the
    /// connection failed or was closed.
    #[error("session {0} is closed")]
    Closed(ConnectionId),

    /// Receiving from the underlying connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
