//! Messages collected under the room lock and delivered after it is released.

use guesswhat_protocol::{PlayerId, ServerMessage};
use guesswhat_session::SessionHandle;

use crate::Player;

/// Who should receive a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recipient {
    All,
    Player(PlayerId),
    AllExcept(PlayerId),
}

/// Deliveries resolved against a membership snapshot.
///
/// Recipients are looked up when a message is pushed, so a message queued
/// before a member leaves still reaches them. Nothing is sent until
/// [`flush`](Self::flush), which callers invoke once the lock is dropped.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    deliveries: Vec<(SessionHandle, ServerMessage)>,
}

impl Outbox {
    pub(crate) fn push(&mut self, members: &[Player], to: Recipient, msg: ServerMessage) {
        let targets = members.iter().filter(|p| match to {
            Recipient::All => true,
            Recipient::Player(id) => p.id == id,
            Recipient::AllExcept(id) => p.id != id,
        });
        for player in targets {
            self.deliveries.push((player.session().clone(), msg.clone()));
        }
    }

    /// Sends everything, in push order. Closed sessions are skipped.
    pub(crate) fn flush(self) {
        for (session, msg) in self.deliveries {
            if session.send(msg).is_err() {
                tracing::trace!(id = %session.id(), "skipping closed session");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.deliveries.len()
    }
}
