//! Typed inbound and outbound messages.
//!
//! The wire keeps the loose `{type, content}` shape; these enums are what
//! the rest of the server works with.

use crate::{Envelope, ProtocolError, RoomCode, Roster, Standing};

// ---------------------------------------------------------------------------
// Drawing actions
// ---------------------------------------------------------------------------

/// The four canvas operations a drawer can broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Draw,
    Fill,
    Undo,
    Clear,
}

impl DrawKind {
    /// The envelope type tag for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Fill => "fill",
            Self::Undo => "undo",
            Self::Clear => "clear",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "draw" => Some(Self::Draw),
            "fill" => Some(Self::Fill),
            "undo" => Some(Self::Undo),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// A drawing action. The payload is opaque to the server and relayed
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawAction {
    pub kind: DrawKind,
    pub payload: String,
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Sets the pseudonym (already trimmed).
    Nickname(String),
    /// Creates a room with the sender as host. The envelope content is
    /// ignored.
    CreateRoom,
    /// Joins the room with this (normalized) code.
    JoinRoom(RoomCode),
    /// Host only: starts the game.
    StartGame,
    /// Drawer only: picks the word to draw.
    ChooseWord(String),
    /// Drawer only: a canvas operation to mirror to the others.
    Draw(DrawAction),
    /// Chat line, which may be a guess.
    Chat(String),
}

impl TryFrom<Envelope> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(env: Envelope) -> Result<Self, Self::Error> {
        let Envelope { kind, content } = env;
        let msg = match kind.as_str() {
            "nickname" => Self::Nickname(content.trim().to_owned()),
            "create_room" => Self::CreateRoom,
            "join_room" => Self::JoinRoom(RoomCode::parse(&content)),
            "start_game" => Self::StartGame,
            "choose_word" => Self::ChooseWord(content),
            "message" => Self::Chat(content),
            other => {
                let kind = DrawKind::from_tag(other)
                    .ok_or_else(|| ProtocolError::UnknownType(other.to_owned()))?;
                Self::Draw(DrawAction { kind, payload: content })
            }
        };
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Everything the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    RoomCreated(RoomCode),
    RoomJoined(RoomCode),
    /// A user-facing error, sent only to the offending connection.
    Error(String),
    /// A public announcement.
    Info(String),
    Players(Roster),
    /// The host's pseudonym.
    Host(String),
    /// Candidate words, sent only to the drawer.
    ChooseWord(Vec<String>),
    /// The chosen word, sent only to the drawer.
    StartDrawing(String),
    /// Sent to everyone except the drawer. Carries the word too.
    StartDrawingPublic(String),
    /// Space-separated placeholders with some letters revealed.
    Hint(String),
    /// The word, revealed at the end of a round.
    RoundEnd(String),
    GameOver(Vec<Standing>),
    /// A relayed drawing action.
    Draw(DrawAction),
    Chat(String),
}

impl ServerMessage {
    /// The envelope type tag for this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomCreated(_) => "room_created",
            Self::RoomJoined(_) => "room_joined",
            Self::Error(_) => "error",
            Self::Info(_) => "info",
            Self::Players(_) => "players",
            Self::Host(_) => "host",
            Self::ChooseWord(_) => "choose_word",
            Self::StartDrawing(_) => "start_drawing",
            Self::StartDrawingPublic(_) => "start_drawing_public",
            Self::Hint(_) => "hint",
            Self::RoundEnd(_) => "round_end",
            Self::GameOver(_) => "game_over",
            Self::Draw(action) => action.kind.as_str(),
            Self::Chat(_) => "chat",
        }
    }

    /// Renders the message into its wire envelope.
    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let content = match self {
            Self::RoomCreated(code) | Self::RoomJoined(code) => code.to_string(),
            Self::Players(roster) => roster.encode()?,
            Self::ChooseWord(words) => {
                serde_json::to_string(words).map_err(ProtocolError::Encode)?
            }
            Self::GameOver(standings) => standings
                .iter()
                .map(Standing::to_string)
                .collect::<Vec<_>>()
                .join(Standing::SEPARATOR),
            Self::Draw(action) => action.payload.clone(),
            Self::Error(text)
            | Self::Info(text)
            | Self::Host(text)
            | Self::StartDrawing(text)
            | Self::StartDrawingPublic(text)
            | Self::Hint(text)
            | Self::RoundEnd(text)
            | Self::Chat(text) => text.clone(),
        };
        Ok(Envelope::new(self.kind(), content))
    }
}
