//! Core wire types: identities, the envelope, and the structured payloads
//! that travel inside `content`.

use std::fmt;

use guesswhat_transport::ConnectionId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A player is bound to exactly one connection for its whole life (there is
/// no reconnection), so the id is derived from the [`ConnectionId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-typable room code such as `K7QXM`.
///
/// Codes are built from an alphabet without the look-alike characters
/// `I`, `O`, `0` and `1`. Lookups normalize user input with
/// [`RoomCode::parse`], so `" k7qxm "` and `"K7QXM"` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Characters a generated code is drawn from.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Length of a generated code.
    pub const LEN: usize = 5;

    /// Draws a random code. Uniqueness is the registry's job.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LEN)
            .map(|_| char::from(Self::ALPHABET[rng.random_range(0..Self::ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Normalizes user input (trim + uppercase) into a code for lookup.
    ///
    /// No validation against the alphabet: an unknown code simply misses
    /// in the registry.
    pub fn parse(input: &str) -> Self {
        Self(input.trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level message wrapper. Every frame in both directions is one
/// envelope:
///
/// ```json
/// { "type": "join_room", "content": "K7QXM" }
/// ```
///
/// `content` is always a string. Depending on `type` it holds a room code,
/// a word, chat text, or a pre-serialized JSON sub-payload. A missing
/// `content` decodes as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The message type tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// The payload, always a string on the wire.
    #[serde(default)]
    pub content: String,
}

impl Envelope {
    /// Builds an envelope from a type tag and content.
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One member's line in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub pseudonym: String,
    pub score: u32,
    /// Whether this member is the current drawer.
    pub drawing: bool,
}

impl RosterEntry {
    /// Marker appended to the drawer's label.
    pub const DRAWER_MARKER: &'static str = " 🎨";

    /// Renders the display label: `"alice (120 pts)"`, plus the drawer marker.
    pub fn label(&self) -> String {
        let mut label = format!("{} ({} pts)", self.pseudonym, self.score);
        if self.drawing {
            label.push_str(Self::DRAWER_MARKER);
        }
        label
    }
}

/// Snapshot of every member's label, in join order.
///
/// On the wire this is the JSON array of labels carried in the `content` of
/// a `players` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    labels: Vec<String>,
}

impl Roster {
    /// Builds a roster from entries, preserving their order.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a RosterEntry>) -> Self {
        Self {
            labels: entries.into_iter().map(RosterEntry::label).collect(),
        }
    }

    /// The rendered labels in member order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Serializes the roster into envelope content.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(&self.labels).map_err(ProtocolError::Encode)
    }

    /// Parses envelope content back into a roster.
    pub fn decode(content: &str) -> Result<Self, ProtocolError> {
        let labels = serde_json::from_str(content).map_err(ProtocolError::Decode)?;
        Ok(Self { labels })
    }
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

/// A final score line shown at game over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub pseudonym: String,
    pub score: u32,
}

impl Standing {
    /// Separator between standings in `game_over` content.
    pub const SEPARATOR: &'static str = " | ";
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} pts", self.pseudonym, self.score)
    }
}
