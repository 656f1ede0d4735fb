//! Rooms and the turn cycle for GuessWhat.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms under fresh codes, finds and reaps them
//! - [`Room`]: membership, broadcast, and the turn state machine
//! - [`Player`]: a named participant bound to one session
//! - [`Phase`]: where a room is in the turn cycle
//! - [`RoomConfig`]: word list, scoring, and round limits
//!
//! Every room owns one lock. Operations mutate under it and deliver their
//! messages after releasing it, so a slow client never holds up a room.

mod config;
mod error;
pub mod hint;
mod outbox;
mod player;
mod registry;
mod room;
mod turn;

pub use config::{DEFAULT_WORDS, Phase, RoomConfig};
pub use error::RoomError;
pub use player::Player;
pub use registry::RoomRegistry;
pub use room::{MemberInfo, Room, RoomSnapshot};
