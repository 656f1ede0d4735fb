//! Per-connection handler: the message router.
//!
//! Each accepted connection gets its own task running [`handle_connection`].
//! The task's only suspension point between messages is waiting for the
//! next envelope; everything a message triggers that takes time (hints,
//! round cap, intermission) is spawned by the room.
//!
//! The flow is:
//!   1. `nickname` records a pseudonym
//!   2. `create_room` / `join_room` puts the player in a room, leaving any
//!      earlier one
//!   3. game messages are forwarded to that room
//!   4. on close or read failure the player leaves and an empty room is
//!      reaped

use std::sync::Arc;

use guesswhat_protocol::{ClientMessage, Codec, PlayerId, RoomCode, ServerMessage};
use guesswhat_room::{Player, Room};
use guesswhat_session::{Session, SessionHandle};
use guesswhat_transport::{Connection, TransportError};

use crate::GuessWhatError;
use crate::server::ServerState;

/// Sent when a player tries to create or join a room before naming
/// themselves.
pub const NICKNAME_REQUIRED: &str = "⚠️ Choose a nickname first";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, K>(
    conn: C,
    state: Arc<ServerState<K>>,
) -> Result<(), GuessWhatError>
where
    C: Connection<Error = TransportError>,
    K: Codec + Clone,
{
    let session = Session::start(conn, state.codec.clone());
    let player_id = PlayerId::from(session.id());
    tracing::debug!(%player_id, "handling new connection");

    let mut router = Router {
        state,
        player_id,
        session: session.handle(),
        pseudonym: None,
        room: None,
    };

    let result = loop {
        match session.recv().await {
            Ok(Some(msg)) => router.dispatch(msg).await,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed");
                break Ok(());
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break Err(e.into());
            }
        }
    };

    router.leave_room().await;
    session.close().await;
    result
}

/// What one connection knows about its player.
struct Router<K: Codec> {
    state: Arc<ServerState<K>>,
    player_id: PlayerId,
    session: SessionHandle,
    /// Set by `nickname`. Trimmed, non-empty.
    pseudonym: Option<String>,
    room: Option<Arc<Room>>,
}

impl<K: Codec> Router<K> {
    async fn dispatch(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Nickname(name) => self.set_nickname(name),
            ClientMessage::CreateRoom => self.create_room().await,
            ClientMessage::JoinRoom(code) => self.join_room(code).await,
            ClientMessage::StartGame => {
                let Some(room) = &self.room else { return };
                if let Err(e) = room.start_game(self.player_id).await {
                    self.reply(ServerMessage::Error(e.to_string()));
                }
            }
            ClientMessage::ChooseWord(word) => {
                if let Some(room) = &self.room {
                    room.choose_word(self.player_id, &word).await;
                }
            }
            ClientMessage::Draw(action) => {
                if let Some(room) = &self.room {
                    room.relay_draw(self.player_id, action).await;
                }
            }
            ClientMessage::Chat(text) => {
                if let Some(room) = &self.room {
                    room.chat(self.player_id, &text).await;
                }
            }
        }
    }

    fn set_nickname(&mut self, name: String) {
        if self.room.is_some() {
            tracing::debug!(player_id = %self.player_id, "nickname change inside a room ignored");
            return;
        }
        if name.is_empty() {
            return;
        }
        tracing::debug!(player_id = %self.player_id, pseudonym = %name, "nickname set");
        self.pseudonym = Some(name);
    }

    async fn create_room(&mut self) {
        let Some(player) = self.new_player() else {
            self.reply(ServerMessage::Error(NICKNAME_REQUIRED.to_owned()));
            return;
        };

        self.leave_room().await;
        let room = self.state.rooms.create_room(player).await;
        self.reply(ServerMessage::RoomCreated(room.code().clone()));
        room.announce_created().await;
        self.room = Some(room);
    }

    async fn join_room(&mut self, code: RoomCode) {
        let Some(player) = self.new_player() else {
            self.reply(ServerMessage::Error(NICKNAME_REQUIRED.to_owned()));
            return;
        };
        if self.room.as_ref().is_some_and(|r| *r.code() == code) {
            tracing::debug!(player_id = %self.player_id, %code, "already in this room");
            return;
        }

        let room = match self.state.rooms.find_room(&code).await {
            Ok(room) => room,
            Err(e) => {
                tracing::debug!(player_id = %self.player_id, %code, "join of unknown room");
                self.reply(ServerMessage::Error(e.to_string()));
                return;
            }
        };

        // The old room is only left once the new one has taken the player.
        match room.join(player).await {
            Ok(()) => {
                self.leave_room().await;
                self.room = Some(room);
            }
            Err(e) => {
                tracing::debug!(player_id = %self.player_id, %code, error = %e, "join refused");
                self.reply(ServerMessage::Error(e.to_string()));
            }
        }
    }

    /// Leaves the current room, if any, and reaps it once empty.
    async fn leave_room(&mut self) {
        let Some(room) = self.room.take() else { return };
        match room.leave(self.player_id).await {
            Ok(0) => {
                self.state.rooms.reap_if_empty(room.code()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(player_id = %self.player_id, error = %e, "leave failed");
            }
        }
    }

    fn new_player(&self) -> Option<Player> {
        let name = self.pseudonym.as_ref()?;
        Some(Player::new(name.clone(), self.session.clone()))
    }

    /// Sends to this connection only.
    fn reply(&self, msg: ServerMessage) {
        if let Err(e) = self.session.send(msg) {
            tracing::trace!(player_id = %self.player_id, error = %e, "reply dropped");
        }
    }
}
