//! A named participant bound to one connection.

use std::time::SystemTime;

use guesswhat_protocol::{PlayerId, RosterEntry, Standing};
use guesswhat_session::SessionHandle;

/// A player as a room sees it.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    /// Non-empty, trimmed.
    pub pseudonym: String,
    pub score: u32,
    pub joined_at: SystemTime,
    session: SessionHandle,
}

impl Player {
    /// Creates a player with a zero score, stamped with the current time.
    pub fn new(pseudonym: impl Into<String>, session: SessionHandle) -> Self {
        Self {
            id: PlayerId::from(session.id()),
            pseudonym: pseudonym.into(),
            score: 0,
            joined_at: SystemTime::now(),
            session,
        }
    }

    /// Outbound handle for this player's connection.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub(crate) fn roster_entry(&self, drawing: bool) -> RosterEntry {
        RosterEntry {
            pseudonym: self.pseudonym.clone(),
            score: self.score,
            drawing,
        }
    }

    pub(crate) fn standing(&self) -> Standing {
        Standing {
            pseudonym: self.pseudonym.clone(),
            score: self.score,
        }
    }
}
