//! Error types for the room layer.

use guesswhat_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
///
/// `NotFound` and `NotEnoughPlayers` are user-facing: their `Display` text
/// is what the offending client receives in an `error` envelope.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("❌ Unknown room {0}")]
    NotFound(RoomCode),

    /// The host tried to start with too few members.
    #[error("⚠️ At least {need} players are needed to start (currently {have})")]
    NotEnoughPlayers { need: usize, have: usize },

    /// The player is already a member of this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomCode),
}
