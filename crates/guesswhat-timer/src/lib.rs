//! Turn timeline and one-shot deferred tasks for GuessWhat.
//!
//! A drawing round is driven by a fixed timeline measured from the moment
//! the drawer picks a word:
//!
//! ```text
//! 0s ── 20s ──── 35s ──── 50s ──── 60s
//!       hint(1)  hint(2)  hint(3)  round cap
//! ```
//!
//! followed, between rounds, by a short intermission before the next
//! drawer is picked.
//!
//! # No cancellation
//!
//! Nothing here is ever cancelled. A round can end early (everyone guessed)
//! while its timeline is still sleeping; the event handler is expected to
//! re-check the room and answer [`Flow::Stop`] when the round it was
//! scheduled for is over. That keeps a stale timer a harmless no-op
//! instead of a race.
//!
//! # Integration
//!
//! ```ignore
//! let round = state.round;
//! spawn_timeline(&config.timings, move |event| {
//!     let room = Arc::clone(&room);
//!     async move { room.on_timeline(round, event).await }
//! });
//! ```

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One scheduled partial reveal of the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintStage {
    /// Offset from the start of drawing.
    pub at: Duration,
    /// How many letters this hint reveals.
    pub letters: usize,
}

/// Timing of one round and of the pause between rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimings {
    /// Hint reveals, in firing order.
    pub hints: Vec<HintStage>,
    /// Offset from the start of drawing at which the round ends regardless
    /// of guesses.
    pub round_cap: Duration,
    /// Pause between the end of a round and the next drawer being picked.
    pub intermission: Duration,
}

impl Default for TurnTimings {
    fn default() -> Self {
        Self {
            hints: vec![
                HintStage { at: Duration::from_secs(20), letters: 1 },
                HintStage { at: Duration::from_secs(35), letters: 2 },
                HintStage { at: Duration::from_secs(50), letters: 3 },
            ],
            round_cap: Duration::from_secs(60),
            intermission: Duration::from_secs(4),
        }
    }
}

impl TurnTimings {
    /// Sorts hint stages by offset and drops the ones that would fire at or
    /// after the round cap (they could never be shown).
    pub fn validated(mut self) -> Self {
        self.hints.sort_by_key(|h| h.at);
        let cap = self.round_cap;
        let before = self.hints.len();
        self.hints.retain(|h| h.at < cap);
        if self.hints.len() != before {
            warn!(
                dropped = before - self.hints.len(),
                round_cap_s = cap.as_secs_f64(),
                "hint stages at or past the round cap, dropping"
            );
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// An event fired by [`spawn_timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Time for hint stage `stage` (1-based), revealing `letters` letters.
    Hint { stage: usize, letters: usize },
    /// The round cap has been reached.
    RoundCap,
}

/// What the timeline should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going to the next event.
    Continue,
    /// The round this timeline belongs to is over; fire nothing else.
    Stop,
}

/// Runs a round's timeline in a background task.
///
/// Offsets are measured from the call, not from the previous event, so a
/// slow handler does not push later stages back. The handler runs once per
/// event, in order, and the task ends after [`TimelineEvent::RoundCap`] or
/// the first [`Flow::Stop`].
pub fn spawn_timeline<F, Fut>(timings: &TurnTimings, mut on_event: F) -> JoinHandle<()>
where
    F: FnMut(TimelineEvent) -> Fut + Send + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    let start = Instant::now();
    let hints = timings.hints.clone();
    let cap = timings.round_cap;

    tokio::spawn(async move {
        for (i, stage) in hints.iter().enumerate() {
            time::sleep_until(start + stage.at).await;
            let event = TimelineEvent::Hint { stage: i + 1, letters: stage.letters };
            trace!(?event, "timeline fired");
            if on_event(event).await == Flow::Stop {
                trace!(stage = i + 1, "timeline stopped early");
                return;
            }
        }

        time::sleep_until(start + cap).await;
        trace!("timeline reached round cap");
        on_event(TimelineEvent::RoundCap).await;
    })
}

/// Runs `task` once, after `delay`, in a background task.
pub fn spawn_after<Fut>(delay: Duration, task: Fut) -> JoinHandle<()>
where
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        time::sleep(delay).await;
        task.await;
    })
}
