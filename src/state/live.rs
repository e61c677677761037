//! A match opened for live play and the owner context passed to every live operation.

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{dao::models::MatchPatch, state::match_clock::MatchClock};

/// Signed-in owner on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerSession {
    /// Account that owns the tournaments being accessed.
    pub owner_id: Uuid,
}

impl OwnerSession {
    /// Wrap an owner identifier.
    pub fn new(owner_id: Uuid) -> Self {
        Self { owner_id }
    }
}

/// One live-play session: the clock of a single match plus its countdown task.
///
/// Dropping the session aborts the countdown task.
pub struct LiveMatch {
    id: Uuid,
    owner_id: Uuid,
    match_id: Option<Uuid>,
    clock: MatchClock,
    ticker: Option<JoinHandle<()>>,
    pending_write: Option<MatchPatch>,
}

impl LiveMatch {
    /// Session backed by a stored match; the session id equals the match id.
    pub fn stored(owner_id: Uuid, match_id: Uuid, clock: MatchClock) -> Self {
        Self {
            id: match_id,
            owner_id,
            match_id: Some(match_id),
            clock,
            ticker: None,
            pending_write: None,
        }
    }

    /// Ad-hoc session that is never persisted.
    pub fn friendly(owner_id: Uuid, clock: MatchClock) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            match_id: None,
            clock,
            ticker: None,
            pending_write: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owner that opened the session.
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Stored match, `None` for friendlies.
    pub fn match_id(&self) -> Option<Uuid> {
        self.match_id
    }

    /// Clock of the match.
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    /// Mutable clock of the match.
    pub fn clock_mut(&mut self) -> &mut MatchClock {
        &mut self.clock
    }

    /// Install the countdown task, aborting the previous one if any.
    pub fn replace_ticker(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.ticker.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the countdown task if one is running.
    pub fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// Whether a countdown task is installed and still alive.
    pub fn has_ticker(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Write that failed and is waiting for a retry.
    pub fn pending_write(&self) -> Option<&MatchPatch> {
        self.pending_write.as_ref()
    }

    /// Remember a failed write for the next retry.
    pub fn set_pending_write(&mut self, patch: MatchPatch) {
        self.pending_write = Some(patch);
    }

    /// Forget the pending write once it went through or became obsolete.
    pub fn clear_pending_write(&mut self) {
        self.pending_write = None;
    }
}

impl Drop for LiveMatch {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
