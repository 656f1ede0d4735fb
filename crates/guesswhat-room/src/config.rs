//! Room configuration and the turn phase machine.

use std::fmt;

use guesswhat_timer::TurnTimings;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Words offered to drawers when no custom list is configured.
pub const DEFAULT_WORDS: &[&str] = &[
    "chat",
    "chien",
    "maison",
    "voiture",
    "plage",
    "soleil",
    "ordinateur",
    "pizza",
    "panda",
    "fleur",
    "arbre",
    "montagne",
    "clé",
    "fantôme",
    "robot",
];

/// Rules shared by every room of a server.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Members needed before the host may start.
    pub min_players: usize,

    /// The game ends once the round counter passes
    /// `members × rounds_per_member`.
    pub rounds_per_member: u32,

    /// How many candidate words the drawer is offered.
    pub word_choices: usize,

    /// Points for a correct guess before the random bonus.
    pub base_points: u32,

    /// Upper bound (inclusive) of the uniform bonus added to `base_points`.
    pub bonus_points: u32,

    /// Candidate word pool. Duplicates are allowed.
    pub words: Vec<String>,

    pub timings: TurnTimings,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            rounds_per_member: 3,
            word_choices: 3,
            base_points: 50,
            bonus_points: 50,
            words: DEFAULT_WORDS.iter().map(|w| (*w).to_owned()).collect(),
            timings: TurnTimings::default(),
        }
    }
}

impl RoomConfig {
    /// Normalizes the timings and refuses an empty word pool.
    pub fn validated(mut self) -> Self {
        self.timings = self.timings.validated();
        self.words.retain(|w| !w.trim().is_empty());
        if self.words.is_empty() {
            tracing::warn!("empty word list, falling back to the built-in words");
            self.words = Self::default().words;
        }
        self
    }

    /// Last round number that is still played with `members` in the room.
    pub fn max_rounds(&self, members: usize) -> u32 {
        u32::try_from(members)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.rounds_per_member)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in the turn cycle.
///
/// ```text
/// Lobby → ChoosingWord → Drawing → RoundEnd ─┬→ ChoosingWord
///                                            └→ GameOver
/// ```
///
/// `GameOver` behaves like `Lobby`: the host may start again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    ChoosingWord,
    Drawing,
    RoundEnd,
    GameOver,
}

impl Phase {
    /// Whether a game is under way (the host cannot start another).
    pub fn is_in_game(self) -> bool {
        matches!(self, Self::ChoosingWord | Self::Drawing | Self::RoundEnd)
    }

    /// Whether guesses and drawing actions count right now.
    pub fn is_drawing(self) -> bool {
        self == Self::Drawing
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lobby => "lobby",
            Self::ChoosingWord => "choosing_word",
            Self::Drawing => "drawing",
            Self::RoundEnd => "round_end",
            Self::GameOver => "game_over",
        };
        f.write_str(s)
    }
}
