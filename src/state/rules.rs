//! Per-match configuration, resolved once when a match is opened for live play.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    config::FriendlyDefaults,
    dao::models::{MatchEntity, TournamentEntity, TournamentFormat},
    state::match_clock::Score,
};

/// When a level score after regulation (or extra time) must be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakPolicy {
    /// A draw is an acceptable final result.
    DrawAllowed,
    /// A level score escalates to extra time and/or penalties.
    Required,
    /// Second leg of a two-legged tie: escalation depends on the aggregate.
    /// `first_leg` holds the first leg goals of this match's side A and side B.
    RequiredOnAggregate {
        /// First leg goals, mapped onto this match's sides.
        first_leg: Score,
    },
}

impl TieBreakPolicy {
    /// Whether `score` at the end of a period calls for a tie-break.
    pub fn needs_tie_break(&self, score: Score) -> bool {
        match self {
            TieBreakPolicy::DrawAllowed => false,
            TieBreakPolicy::Required => score.a == score.b,
            TieBreakPolicy::RequiredOnAggregate { first_leg } => {
                score.a + first_leg.a == score.b + first_leg.b
            }
        }
    }
}

/// How a friendly match handles a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FriendlyPolicy {
    /// Keep the draw.
    #[default]
    AllowDraw,
    /// Play extra time, then penalties.
    ExtraTime,
    /// Go straight to penalties.
    Penalties,
}

/// Immutable rules threaded through the clock for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    /// Regulation half length in seconds.
    pub half_duration_secs: u32,
    /// Extra-time half length in seconds, when extra time is played.
    pub extra_time_half_secs: Option<u32>,
    /// Regulation penalty kicks per side.
    pub penalty_kicks: u8,
    /// Tie-break escalation policy.
    pub tie_break: TieBreakPolicy,
}

impl MatchRules {
    /// Resolve the rules of a stored match from its tournament.
    ///
    /// `first_leg` is the other leg of the tie when `entity` is a second leg; it only counts once
    /// closed and when both teams can be matched across legs.
    pub fn for_match(
        tournament: &TournamentEntity,
        entity: &MatchEntity,
        first_leg: Option<&MatchEntity>,
    ) -> Self {
        let elimination =
            entity.is_elimination || tournament.format == TournamentFormat::Elimination;

        let tie_break = if !elimination {
            TieBreakPolicy::DrawAllowed
        } else if tournament.two_legged && entity.leg == Some(1) {
            TieBreakPolicy::DrawAllowed
        } else if tournament.two_legged && entity.leg == Some(2) {
            first_leg
                .and_then(|leg| first_leg_score(leg, entity))
                .map(|first_leg| TieBreakPolicy::RequiredOnAggregate { first_leg })
                .unwrap_or(TieBreakPolicy::Required)
        } else {
            TieBreakPolicy::Required
        };

        Self {
            half_duration_secs: tournament.half_duration_minutes.max(1) * 60,
            extra_time_half_secs: tournament
                .extra_time
                .then(|| tournament.extra_time_minutes.max(1) * 60),
            penalty_kicks: tournament.penalty_kicks,
            tie_break,
        }
    }

    /// Rules for an ad-hoc match using the configured defaults.
    pub fn friendly(defaults: &FriendlyDefaults, policy: FriendlyPolicy) -> Self {
        let (tie_break, extra_time_half_secs) = match policy {
            FriendlyPolicy::AllowDraw => (TieBreakPolicy::DrawAllowed, None),
            FriendlyPolicy::ExtraTime => (
                TieBreakPolicy::Required,
                Some(defaults.extra_time_minutes.max(1) * 60),
            ),
            FriendlyPolicy::Penalties => (TieBreakPolicy::Required, None),
        };

        Self {
            half_duration_secs: defaults.half_duration_minutes.max(1) * 60,
            extra_time_half_secs,
            penalty_kicks: defaults.penalty_kicks,
            tie_break,
        }
    }
}

/// First leg goals of `second_leg`'s side A and side B, tolerant of swapped home/away.
fn first_leg_score(first_leg: &MatchEntity, second_leg: &MatchEntity) -> Option<Score> {
    if !first_leg.closed {
        return None;
    }
    let a = first_leg.goals_for(second_leg.team_a_id()?)?;
    let b = first_leg.goals_for(second_leg.team_b_id()?)?;
    Some(Score { a, b })
}
