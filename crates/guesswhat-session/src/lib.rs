//! Connection sessions for GuessWhat.
//!
//! A session is the leaf of the stack: it wraps one client's connection and
//! knows how to receive typed [`ClientMessage`]s and send typed
//! [`ServerMessage`]s. It owns no game logic.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room / Router (above)   ← hold SessionHandles, push ServerMessages
//!     ↕
//! Session (this crate)    ← outbound queue + writer pump, typed receive
//!     ↕
//! Transport + Protocol    ← text frames, envelopes
//! ```
//!
//! Outbound delivery is decoupled from the caller: [`SessionHandle::send`]
//! only pushes onto an unbounded queue and never waits, so a room can fan
//! a broadcast out to every member without touching the network. The
//! writer pump drains the queue onto the connection in order.
//!
//! [`ClientMessage`]: guesswhat_protocol::ClientMessage
//! [`ServerMessage`]: guesswhat_protocol::ServerMessage

mod error;
mod session;

pub use error::SessionError;
pub use session::{Session, SessionHandle, SessionReceiver};
