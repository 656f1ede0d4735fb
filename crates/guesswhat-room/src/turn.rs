//! The turn scheduler: start, word choice, guesses, timed hints, round end
//! and game over.
//!
//! Timed work (hints, the round cap, the pause before the next turn) runs
//! in spawned tasks that are never cancelled. Each one carries the turn it
//! was scheduled for and does nothing once that turn is over, even if a new
//! game has since reset the round counter.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use guesswhat_protocol::{DrawAction, PlayerId, ServerMessage, Standing};
use guesswhat_timer::{Flow, TimelineEvent, spawn_after, spawn_timeline};
use rand::Rng;

use crate::hint;
use crate::outbox::{Outbox, Recipient};
use crate::room::RoomState;
use crate::{Phase, Room, RoomConfig, RoomError};

/// Timed work an operation asks for once its lock is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowUp {
    /// Run the hint/round-cap timeline for this turn.
    Timeline { turn: u64 },
    /// Pick the next drawer after the intermission, if still on this turn.
    NextTurn { turn: u64 },
}

/// How a finished round left the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundOutcome {
    NextTurn,
    GameOver,
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

// ---------------------------------------------------------------------------
// State transitions (lock held)
// ---------------------------------------------------------------------------

impl RoomState {
    /// Picks a drawer and offers them candidate words.
    fn begin_turn(&mut self, config: &RoomConfig, out: &mut Outbox) {
        if self.members.is_empty() {
            self.phase = Phase::Lobby;
            self.drawer = None;
            return;
        }

        let drawer = self.members[self.rng.random_range(0..self.members.len())].id;
        self.turn += 1;
        self.drawer = Some(drawer);
        self.guessed.clear();
        self.phase = Phase::ChoosingWord;

        let words = hint::candidates(&config.words, config.word_choices, &mut *self.rng);
        self.push(out, Recipient::Player(drawer), ServerMessage::ChooseWord(words));
        self.announce(out, format!("🖌️ {} is choosing a word...", self.pseudonym(drawer)));
        self.push_roster(out);
    }

    /// Ends the active round. A no-op without an active word, so the round
    /// cap and an all-found guess can both call it safely.
    fn finish_round(&mut self, config: &RoomConfig, out: &mut Outbox) -> Option<RoundOutcome> {
        if self.word.is_empty() {
            return None;
        }

        let word = std::mem::take(&mut self.word);
        self.push(out, Recipient::All, ServerMessage::RoundEnd(word.clone()));
        self.announce(out, format!("✅ Round over! The word was '{word}'."));
        self.round += 1;
        self.push_roster(out);

        if self.round > config.max_rounds(self.members.len()) {
            self.finish_game(out);
            Some(RoundOutcome::GameOver)
        } else {
            self.phase = Phase::RoundEnd;
            Some(RoundOutcome::NextTurn)
        }
    }

    fn finish_game(&mut self, out: &mut Outbox) {
        self.phase = Phase::GameOver;
        self.drawer = None;
        self.guessed.clear();

        let standings: Vec<Standing> = self.members.iter().map(|p| p.standing()).collect();
        self.push(out, Recipient::All, ServerMessage::GameOver(standings));
        self.announce(out, "🏁 Game over!".to_owned());
    }

    fn all_found(&self) -> bool {
        self.members
            .iter()
            .filter(|p| self.drawer != Some(p.id))
            .all(|p| self.guessed.contains(&p.id))
    }

    /// Scores `player` if `text` is their first correct guess this round.
    /// Returns the awarded points.
    fn try_guess(&mut self, config: &RoomConfig, player: PlayerId, text: &str) -> Option<u32> {
        let eligible = self.phase.is_drawing()
            && !self.word.is_empty()
            && self.drawer != Some(player)
            && !self.guessed.contains(&player);
        if !eligible || text.to_lowercase() != self.word {
            return None;
        }

        let points = config.base_points + self.rng.random_range(0..=config.bonus_points);
        let member = self.members.iter_mut().find(|p| p.id == player)?;
        member.score += points;
        self.guessed.insert(player);
        Some(points)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Room {
    /// Starts a game on behalf of `requester`.
    ///
    /// Anyone but the host, or a game already under way, is ignored.
    ///
    /// # Errors
    /// [`RoomError::NotEnoughPlayers`] when the host starts too early.
    pub async fn start_game(self: &Arc<Self>, requester: PlayerId) -> Result<(), RoomError> {
        let mut out = Outbox::default();
        {
            let mut state = self.state.lock().await;
            if state.host != Some(requester) {
                tracing::debug!(code = %self.code(), player_id = %requester, "start from non-host ignored");
                return Ok(());
            }
            if state.phase.is_in_game() {
                tracing::debug!(code = %self.code(), phase = %state.phase, "game already started");
                return Ok(());
            }
            let need = self.config().min_players;
            let have = state.members.len();
            if have < need {
                return Err(RoomError::NotEnoughPlayers { need, have });
            }

            state.round = 1;
            tracing::info!(code = %self.code(), players = have, "game started");
            state.announce(&mut out, "🚀 The game begins!".to_owned());
            state.begin_turn(self.config(), &mut out);
        }
        out.flush();
        Ok(())
    }

    /// The drawer picks the word for this round.
    ///
    /// Ignored unless `player` is the drawer and the room is waiting for a
    /// choice, or if the word is blank.
    pub async fn choose_word(self: &Arc<Self>, player: PlayerId, word: &str) {
        let word = word.trim().to_lowercase();
        let mut out = Outbox::default();
        let turn = {
            let mut state = self.state.lock().await;
            if state.phase != Phase::ChoosingWord || state.drawer != Some(player) || word.is_empty() {
                tracing::debug!(code = %self.code(), player_id = %player, "word choice ignored");
                return;
            }

            state.word = word.clone();
            state.guessed.clear();
            state.phase = Phase::Drawing;
            tracing::info!(code = %self.code(), round = state.round, "drawing started");

            state.push(&mut out, Recipient::Player(player), ServerMessage::StartDrawing(word.clone()));
            state.push(&mut out, Recipient::AllExcept(player), ServerMessage::StartDrawingPublic(word));
            state.announce(&mut out, format!("✏️ {} starts drawing!", state.pseudonym(player)));
            state.turn
        };
        out.flush();
        self.schedule(FollowUp::Timeline { turn });
    }

    /// Mirrors a canvas action from the drawer to everyone else.
    pub async fn relay_draw(&self, player: PlayerId, action: DrawAction) {
        let mut out = Outbox::default();
        {
            let state = self.state.lock().await;
            if !state.phase.is_drawing() || state.drawer != Some(player) {
                tracing::debug!(code = %self.code(), player_id = %player, kind = action.kind.as_str(), "draw from non-drawer ignored");
                return;
            }
            state.push(&mut out, Recipient::AllExcept(player), ServerMessage::Draw(action));
        }
        out.flush();
    }

    /// Handles a chat line, which may be a guess.
    ///
    /// A first correct guess scores and is celebrated instead of relayed;
    /// once every non-drawer has found the word the round ends at once.
    /// Anything else is relayed as `"pseudonym: text"`.
    pub async fn chat(self: &Arc<Self>, player: PlayerId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let mut out = Outbox::default();
        let follow_up = {
            let mut state = self.state.lock().await;
            let Some(pseudonym) = state.member(player).map(|p| p.pseudonym.clone()) else {
                return;
            };

            match state.try_guess(self.config(), player, text) {
                Some(points) => {
                    tracing::info!(code = %self.code(), player_id = %player, points, "word found");
                    state.push(
                        &mut out,
                        Recipient::All,
                        ServerMessage::Chat(format!("🏆 {pseudonym} found the word! (+{points})")),
                    );
                    state.push_roster(&mut out);
                    if state.all_found() {
                        tracing::debug!(code = %self.code(), "everyone found the word");
                        self.close_round(&mut state, &mut out)
                    } else {
                        None
                    }
                }
                None => {
                    state.push(&mut out, Recipient::All, ServerMessage::Chat(format!("{pseudonym}: {text}")));
                    None
                }
            }
        };
        out.flush();
        if let Some(f) = follow_up {
            self.schedule(f);
        }
    }

    /// Ends the active round. Calling it again, or with no active word,
    /// does nothing.
    pub async fn end_round(self: &Arc<Self>) {
        let mut out = Outbox::default();
        let follow_up = {
            let mut state = self.state.lock().await;
            self.close_round(&mut state, &mut out)
        };
        out.flush();
        if let Some(f) = follow_up {
            self.schedule(f);
        }
    }

    // -- timed continuations -------------------------------------------------

    async fn on_timeline(self: Arc<Self>, turn: u64, event: TimelineEvent) -> Flow {
        let mut out = Outbox::default();
        let (flow, follow_up) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if state.word.is_empty() || state.turn != turn {
                tracing::trace!(code = %self.code(), turn, ?event, "stale timer");
                return Flow::Stop;
            }
            let round = state.round;

            match event {
                TimelineEvent::Hint { stage, letters } => {
                    let shown = hint::reveal(&state.word, letters, &mut *state.rng);
                    tracing::trace!(code = %self.code(), round, stage, "hint");
                    state.push(&mut out, Recipient::All, ServerMessage::Hint(shown));
                    (Flow::Continue, None)
                }
                TimelineEvent::RoundCap => {
                    tracing::debug!(code = %self.code(), round, "round cap reached");
                    (Flow::Stop, self.close_round(state, &mut out))
                }
            }
        };
        out.flush();
        if let Some(f) = follow_up {
            self.schedule(f);
        }
        flow
    }

    async fn on_intermission(self: Arc<Self>, turn: u64) {
        let mut out = Outbox::default();
        {
            let mut state = self.state.lock().await;
            if state.phase != Phase::RoundEnd || state.turn != turn {
                tracing::trace!(code = %self.code(), turn, "stale intermission");
                return;
            }
            state.begin_turn(self.config(), &mut out);
        }
        out.flush();
    }

    fn schedule(self: &Arc<Self>, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Timeline { turn } => {
                let room = Arc::clone(self);
                spawn_timeline(&self.config().timings, move |event| -> BoxFuture<Flow> {
                    Box::pin(Arc::clone(&room).on_timeline(turn, event))
                });
            }
            FollowUp::NextTurn { turn } => {
                let task: BoxFuture<()> = Box::pin(Arc::clone(self).on_intermission(turn));
                spawn_after(self.config().timings.intermission, task);
            }
        }
    }

    /// Finishes the round under the lock, logging the outcome, and returns
    /// the timed work it needs.
    fn close_round(&self, state: &mut RoomState, out: &mut Outbox) -> Option<FollowUp> {
        match state.finish_round(self.config(), out)? {
            RoundOutcome::NextTurn => {
                tracing::info!(code = %self.code(), next_round = state.round, "round ended");
                Some(FollowUp::NextTurn { turn: state.turn })
            }
            RoundOutcome::GameOver => {
                tracing::info!(code = %self.code(), rounds = state.round - 1, "game over");
                None
            }
        }
    }
}
