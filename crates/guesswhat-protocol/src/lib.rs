//! Wire protocol for GuessWhat.
//!
//! Every frame on the wire is an [`Envelope`]: `{"type": ..., "content": ...}`
//! where `content` is always a string. This crate turns that untyped shape
//! into sum types at the boundary:
//!
//! - **Inbound**: [`ClientMessage`], decoded from an envelope with
//!   [`ClientMessage::try_from`]. Unknown types are a [`ProtocolError`].
//! - **Outbound**: [`ServerMessage`], rendered into an envelope with
//!   [`ServerMessage::to_envelope`]. Structured payloads (roster, candidate
//!   words, standings) are serialized into `content` here and nowhere else.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): envelope ⇄ text frame.
//!
//! ```text
//! Transport (text) → Protocol (Envelope → ClientMessage) → Router → Room
//! Room → ServerMessage → Protocol (Envelope → text) → Transport
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{ClientMessage, DrawAction, DrawKind, ServerMessage};
pub use types::{Envelope, PlayerId, RoomCode, Roster, RosterEntry, Standing};
