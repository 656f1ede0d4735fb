//! A room: membership, broadcast fan-out, and the state the turn scheduler
//! drives.
//!
//! All state sits behind one per-room lock. Operations lock, mutate, queue
//! their messages into an [`Outbox`], unlock, and only then deliver. No
//! lock is ever held across a send or a sleep.

use std::collections::HashSet;
use std::sync::Arc;

use guesswhat_protocol::{PlayerId, RoomCode, Roster, ServerMessage};
use rand::RngCore;
use tokio::sync::Mutex;

use crate::outbox::{Outbox, Recipient};
use crate::{Phase, Player, RoomConfig, RoomError};

/// Mutable room state. Only ever touched with the room lock held.
pub(crate) struct RoomState {
    /// Join order.
    pub(crate) members: Vec<Player>,
    pub(crate) host: Option<PlayerId>,
    pub(crate) drawer: Option<PlayerId>,
    /// Lower-cased. Empty means no active word.
    pub(crate) word: String,
    /// Players who found the word this round. Never contains the drawer.
    pub(crate) guessed: HashSet<PlayerId>,
    pub(crate) round: u32,
    /// Bumped every time a drawer is picked and never reset, so timers
    /// scheduled in an earlier turn or an earlier game can tell they are
    /// stale.
    pub(crate) turn: u64,
    pub(crate) phase: Phase,
    /// Set once the registry has dropped this room; joins are refused.
    pub(crate) closed: bool,
    pub(crate) rng: Box<dyn RngCore + Send>,
}

impl RoomState {
    pub(crate) fn member(&self, id: PlayerId) -> Option<&Player> {
        self.members.iter().find(|p| p.id == id)
    }

    pub(crate) fn pseudonym(&self, id: PlayerId) -> &str {
        self.member(id).map_or("?", |p| p.pseudonym.as_str())
    }

    /// Queues the member labels followed by the host's pseudonym.
    pub(crate) fn push_roster(&self, out: &mut Outbox) {
        let entries: Vec<_> = self
            .members
            .iter()
            .map(|p| p.roster_entry(self.drawer == Some(p.id)))
            .collect();
        out.push(
            &self.members,
            Recipient::All,
            ServerMessage::Players(Roster::from_entries(&entries)),
        );
        if let Some(host) = self.host.and_then(|id| self.member(id)) {
            out.push(&self.members, Recipient::All, ServerMessage::Host(host.pseudonym.clone()));
        }
    }

    pub(crate) fn push(&self, out: &mut Outbox, to: Recipient, msg: ServerMessage) {
        out.push(&self.members, to, msg);
    }

    pub(crate) fn announce(&self, out: &mut Outbox, text: String) {
        out.push(&self.members, Recipient::All, ServerMessage::Info(text));
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One member as seen in a [`RoomSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub id: PlayerId,
    pub pseudonym: String,
    pub score: u32,
}

/// A point-in-time copy of a room's state.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub phase: Phase,
    /// Join order.
    pub members: Vec<MemberInfo>,
    pub host: Option<PlayerId>,
    pub drawer: Option<PlayerId>,
    /// The active word, if any.
    pub word: Option<String>,
    /// Sorted.
    pub guessed: Vec<PlayerId>,
    pub round: u32,
}

impl RoomSnapshot {
    /// Whether a game is under way.
    pub fn started(&self) -> bool {
        self.phase.is_in_game()
    }

    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn score_of(&self, id: PlayerId) -> Option<u32> {
        self.members.iter().find(|m| m.id == id).map(|m| m.score)
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A game room. Shared as `Arc<Room>` between the registry, the
/// connections of its members, and its own timers.
pub struct Room {
    code: RoomCode,
    config: Arc<RoomConfig>,
    pub(crate) state: Mutex<RoomState>,
}

impl Room {
    /// Creates a room with `creator` as its sole member and host.
    ///
    /// `rng` drives every random choice the room makes (drawer, candidate
    /// words, hint positions, bonus points).
    pub fn new(
        code: RoomCode,
        creator: Player,
        config: Arc<RoomConfig>,
        rng: impl RngCore + Send + 'static,
    ) -> Arc<Self> {
        let host = creator.id;
        Arc::new(Self {
            code,
            config,
            state: Mutex::new(RoomState {
                members: vec![creator],
                host: Some(host),
                drawer: None,
                word: String::new(),
                guessed: HashSet::new(),
                round: 0,
                turn: 0,
                phase: Phase::Lobby,
                closed: false,
                rng: Box::new(rng),
            }),
        })
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Tells the members (so far, the creator) who is here and who created
    /// the room.
    pub async fn announce_created(&self) {
        let mut out = Outbox::default();
        {
            let state = self.state.lock().await;
            state.push_roster(&mut out);
            if let Some(host) = state.host {
                state.announce(&mut out, format!("👋 {} created the room.", state.pseudonym(host)));
            }
        }
        out.flush();
    }

    /// Appends `player` to the members and announces them.
    ///
    /// The joiner gets [`ServerMessage::RoomJoined`] ahead of the roster. A
    /// refused join sends nothing.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room has been reaped, and
    /// [`RoomError::AlreadyInRoom`] for a player who is already a member.
    pub async fn join(&self, player: Player) -> Result<(), RoomError> {
        let mut out = Outbox::default();
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(RoomError::NotFound(self.code.clone()));
            }
            if state.member(player.id).is_some() {
                return Err(RoomError::AlreadyInRoom(player.id, self.code.clone()));
            }

            let id = player.id;
            let pseudonym = player.pseudonym.clone();
            tracing::info!(
                code = %self.code,
                player_id = %player.id,
                %pseudonym,
                players = state.members.len() + 1,
                "player joined"
            );
            state.members.push(player);
            state.push(&mut out, Recipient::Player(id), ServerMessage::RoomJoined(self.code.clone()));
            state.push_roster(&mut out);
            state.announce(&mut out, format!("👋 {pseudonym} joined the game."));
        }
        out.flush();
        Ok(())
    }

    /// Removes a member, returning how many remain.
    ///
    /// The host passes to the earliest remaining joiner. A departing drawer
    /// leaves the current round without a drawer; it still ends on its
    /// timer.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `id` is not a member.
    pub async fn leave(&self, id: PlayerId) -> Result<usize, RoomError> {
        let mut out = Outbox::default();
        let remaining = {
            let mut state = self.state.lock().await;
            let Some(index) = state.members.iter().position(|p| p.id == id) else {
                return Err(RoomError::NotInRoom(id, self.code.clone()));
            };
            let gone = state.members.remove(index);
            state.guessed.remove(&id);
            if state.host == Some(id) {
                state.host = state.members.first().map(|p| p.id);
            }
            if state.drawer == Some(id) {
                state.drawer = None;
            }

            tracing::info!(
                code = %self.code,
                player_id = %id,
                players = state.members.len(),
                "player left"
            );
            state.announce(&mut out, format!("❌ {} left the game.", gone.pseudonym));
            state.push_roster(&mut out);
            state.members.len()
        };
        out.flush();
        Ok(remaining)
    }

    /// Delivers `msg` to every member.
    pub async fn broadcast_all(&self, msg: ServerMessage) {
        self.broadcast(Recipient::All, msg).await;
    }

    /// Delivers `msg` to every member except `excluded`.
    pub async fn broadcast_except(&self, excluded: PlayerId, msg: ServerMessage) {
        self.broadcast(Recipient::AllExcept(excluded), msg).await;
    }

    /// Sends every member the current roster, then the host's pseudonym.
    pub async fn broadcast_roster(&self) {
        let mut out = Outbox::default();
        self.state.lock().await.push_roster(&mut out);
        out.flush();
    }

    async fn broadcast(&self, to: Recipient, msg: ServerMessage) {
        let mut out = Outbox::default();
        self.state.lock().await.push(&mut out, to, msg);
        out.flush();
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        let state = self.state.lock().await;
        let mut guessed: Vec<_> = state.guessed.iter().copied().collect();
        guessed.sort_by_key(|id| id.0);
        RoomSnapshot {
            code: self.code.clone(),
            phase: state.phase,
            members: state
                .members
                .iter()
                .map(|p| MemberInfo {
                    id: p.id,
                    pseudonym: p.pseudonym.clone(),
                    score: p.score,
                })
                .collect(),
            host: state.host,
            drawer: state.drawer,
            word: (!state.word.is_empty()).then(|| state.word.clone()),
            guessed,
            round: state.round,
        }
    }

    /// Marks the room closed if nobody is in it. A closed room refuses
    /// joins, so a lookup racing the reap cannot strand a player in it.
    pub(crate) async fn close_if_empty(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.members.is_empty() {
            state.closed = true;
        }
        state.closed
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room").field("code", &self.code).finish_non_exhaustive()
    }
}
