use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{PenaltyRecord, TeamRef},
    dto::phase::VisibleMatchPhase,
    state::{
        LiveMatch,
        match_clock::{Score, ShootoutSnapshot, Side},
    },
};

/// Team display data.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub detail_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crest_url: Option<String>,
}

impl From<TeamRef> for TeamSummary {
    fn from(team: TeamRef) -> Self {
        Self {
            id: team.id,
            name: team.name,
            abbreviation: team.abbreviation,
            primary_color: team.primary_color,
            secondary_color: team.secondary_color,
            detail_color: team.detail_color,
            crest_url: team.crest_url,
        }
    }
}

/// Converted and missed shoot-out kicks per side.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyTally {
    pub goals_a: u32,
    pub goals_b: u32,
    pub misses_a: u32,
    pub misses_b: u32,
}

impl From<PenaltyRecord> for PenaltyTally {
    fn from(record: PenaltyRecord) -> Self {
        Self {
            goals_a: record.goals_a,
            goals_b: record.goals_b,
            misses_a: record.misses_a,
            misses_b: record.misses_b,
        }
    }
}

/// State of a running shoot-out.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct ShootoutView {
    pub regulation_kicks: u32,
    pub tally: PenaltyTally,
    /// Side due to kick next.
    pub turn: Side,
    /// True once sudden death started.
    pub alternating: bool,
    pub finished: bool,
}

impl From<ShootoutSnapshot> for ShootoutView {
    fn from(snapshot: ShootoutSnapshot) -> Self {
        Self {
            regulation_kicks: snapshot.regulation_kicks,
            tally: snapshot.record.into(),
            turn: snapshot.turn,
            alternating: snapshot.alternating,
            finished: snapshot.finished,
        }
    }
}

/// Scoreboard state of a live session, shared by REST responses and SSE events.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct LiveSnapshot {
    /// Live session identifier.
    pub session_id: Uuid,
    /// Stored match behind the session; absent for friendlies.
    pub match_id: Option<Uuid>,
    /// Current period as shown on the scoreboard.
    pub phase: VisibleMatchPhase,
    /// Countdown of the current period.
    pub seconds_remaining: u32,
    /// Whether the countdown is running.
    pub running: bool,
    /// Goals of both sides.
    pub score: Score,
    /// Shoot-out in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shootout: Option<ShootoutView>,
    /// Final shoot-out tallies of a match closed on penalties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalties: Option<PenaltyTally>,
    /// True while a final result could not be written and awaits a retry.
    pub pending_write: bool,
    /// Incremented on every change of the session.
    pub version: usize,
}

impl From<&LiveMatch> for LiveSnapshot {
    fn from(live: &LiveMatch) -> Self {
        let snapshot = live.clock().snapshot();
        Self {
            session_id: live.id(),
            match_id: live.match_id(),
            phase: snapshot.phase.into(),
            seconds_remaining: snapshot.seconds_remaining,
            running: snapshot.running,
            score: snapshot.score,
            shootout: snapshot.shootout.map(Into::into),
            penalties: snapshot.penalties.map(Into::into),
            pending_write: live.pending_write().is_some(),
            version: snapshot.version,
        }
    }
}
