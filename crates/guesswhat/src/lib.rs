//! # GuessWhat
//!
//! A multiplayer draw-and-guess game server.
//!
//! Players connect over WebSocket, pick a nickname, then create a room or
//! join one by its five-character code. The host starts the game; each
//! turn one member draws a word they picked from a few candidates while
//! the others race to guess it in the chat. Hints reveal letters as time
//! runs out, and after every member has drawn a few times the game ends
//! with the standings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guesswhat::prelude::*;
//!
//! # async fn run() -> Result<(), GuessWhatError> {
//! let server = GuessWhatServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::GuessWhatError;
pub use handler::NICKNAME_REQUIRED;
pub use server::{GuessWhatServer, GuessWhatServerBuilder, ServerConfig};

/// Convenience re-exports for embedding the server.
pub mod prelude {
    pub use crate::{GuessWhatError, GuessWhatServer, GuessWhatServerBuilder, ServerConfig};
    pub use guesswhat_protocol::{ClientMessage, Envelope, RoomCode, ServerMessage};
    pub use guesswhat_room::{Phase, RoomConfig};
    pub use guesswhat_timer::{HintStage, TurnTimings};
}
