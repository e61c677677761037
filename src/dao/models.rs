//! Records exchanged with the storage layer.
//!
//! Field names follow the Rust side; the serde aliases accept the column names used by the
//! hosted backend the fixtures are imported from.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

time::serde::format_description!(
    kickoff_format,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]"
);

/// Display data for one participant of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamRef {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Short name shown on the scoreboard.
    #[serde(alias = "abreviacao")]
    pub abbreviation: String,
    /// First body color (CSS color string).
    pub primary_color: String,
    /// Second body color (CSS color string).
    pub secondary_color: String,
    /// Outline/detail color (CSS color string).
    pub detail_color: String,
    /// Optional crest image URL.
    #[serde(default)]
    pub crest_url: Option<String>,
}

/// Penalty shoot-out tallies, by physical side of the match.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PenaltyRecord {
    /// Penalties converted by side A.
    pub goals_a: u32,
    /// Penalties converted by side B.
    pub goals_b: u32,
    /// Penalties missed by side A.
    pub misses_a: u32,
    /// Penalties missed by side B.
    pub misses_b: u32,
}

/// Period in which a closed match was decided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndedIn {
    /// Closed after regulation time (or closed manually before it ended).
    Regulation,
    /// Closed after extra time.
    ExtraTime,
    /// Closed by a penalty shoot-out.
    Penalties,
}

/// One fixture as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Owning tournament; `None` for stand-alone matches.
    #[serde(default, alias = "campeonato_id")]
    pub tournament_id: Option<Uuid>,
    /// Pairing id grouping both legs of an elimination tie.
    #[serde(default, alias = "chave_id")]
    pub pairing_id: Option<String>,
    /// Home side.
    #[serde(default, alias = "time_a")]
    pub team_a: Option<TeamRef>,
    /// Away side.
    #[serde(default, alias = "time_b")]
    pub team_b: Option<TeamRef>,
    /// Whether the match belongs to an elimination stage.
    #[serde(default, alias = "is_mata_mata")]
    pub is_elimination: bool,
    /// Free-text stage label.
    #[serde(default, alias = "etapa")]
    pub stage: Option<String>,
    /// Leg number (1 or 2) for two-legged ties.
    #[serde(default, alias = "perna")]
    pub leg: Option<u8>,
    /// Goals scored by side A.
    #[serde(default, alias = "gols_time_a")]
    pub goals_a: u32,
    /// Goals scored by side B.
    #[serde(default, alias = "gols_time_b")]
    pub goals_b: u32,
    /// Whether the result is final.
    #[serde(default, alias = "encerrada")]
    pub closed: bool,
    /// Shoot-out tallies, present only when the match went to penalties.
    #[serde(default)]
    pub penalties: Option<PenaltyRecord>,
    /// Period in which the match was decided.
    #[serde(default)]
    pub ended_in: Option<EndedIn>,
    /// Free-text venue.
    #[serde(default, alias = "local")]
    pub venue: Option<String>,
    /// Local kick-off time, without timezone.
    #[serde(default, with = "kickoff_format::option", alias = "data_hora")]
    pub kickoff: Option<PrimitiveDateTime>,
}

impl MatchEntity {
    /// Build a fresh, unplayed fixture between two teams.
    pub fn fixture(tournament_id: Option<Uuid>, team_a: TeamRef, team_b: TeamRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            pairing_id: None,
            team_a: Some(team_a),
            team_b: Some(team_b),
            is_elimination: false,
            stage: None,
            leg: None,
            goals_a: 0,
            goals_b: 0,
            closed: false,
            penalties: None,
            ended_in: None,
            venue: None,
            kickoff: None,
        }
    }

    /// Identifier of the home team, if assigned.
    pub fn team_a_id(&self) -> Option<Uuid> {
        self.team_a.as_ref().map(|team| team.id)
    }

    /// Identifier of the away team, if assigned.
    pub fn team_b_id(&self) -> Option<Uuid> {
        self.team_b.as_ref().map(|team| team.id)
    }

    /// Goals scored by `team_id` in this match, whichever side it played on.
    pub fn goals_for(&self, team_id: Uuid) -> Option<u32> {
        if self.team_a_id() == Some(team_id) {
            Some(self.goals_a)
        } else if self.team_b_id() == Some(team_id) {
            Some(self.goals_b)
        } else {
            None
        }
    }

    /// Converted shoot-out kicks by `team_id`, whichever side it played on.
    pub fn penalty_goals_for(&self, team_id: Uuid) -> Option<u32> {
        let penalties = self.penalties?;
        if self.team_a_id() == Some(team_id) {
            Some(penalties.goals_a)
        } else if self.team_b_id() == Some(team_id) {
            Some(penalties.goals_b)
        } else {
            None
        }
    }
}

/// Competition format of a tournament.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Everyone plays everyone.
    RoundRobin,
    /// Group stage.
    Groups,
    /// Knockout bracket.
    Elimination,
}

/// Tournament configuration read by the engines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct TournamentEntity {
    /// Primary key of the tournament.
    pub id: Uuid,
    /// Account that owns the tournament.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Competition format.
    pub format: TournamentFormat,
    /// Length of each regulation half, in minutes.
    #[validate(range(min = 1, max = 90))]
    pub half_duration_minutes: u32,
    /// Whether level elimination matches go to extra time before penalties.
    pub extra_time: bool,
    /// Length of each extra-time half, in minutes.
    #[validate(range(min = 1, max = 30))]
    pub extra_time_minutes: u32,
    /// Regulation penalty kicks per side.
    #[validate(range(min = 1, max = 10))]
    pub penalty_kicks: u8,
    /// Whether elimination ties are played over two legs.
    pub two_legged: bool,
    /// Number of registered teams.
    #[serde(default)]
    pub team_count: u32,
}

/// Outcome of a tournament lookup scoped to an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TournamentLookup {
    /// Tournament exists and belongs to the owner.
    Found(TournamentEntity),
    /// No tournament with this id.
    NotFound,
    /// Tournament exists but belongs to somebody else.
    Forbidden,
}

/// Filter applied when listing the matches of a tournament.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFilter {
    /// Only return elimination-stage matches.
    pub elimination_only: bool,
}

/// Partial update of a match record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchPatch {
    /// New goals for side A.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals_a: Option<u32>,
    /// New goals for side B.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals_b: Option<u32>,
    /// New closure flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    /// Shoot-out tallies to store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalties: Option<PenaltyRecord>,
    /// Period in which the match was decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_in: Option<EndedIn>,
}

impl MatchPatch {
    /// Apply every present field onto `entity`.
    pub fn apply_to(&self, entity: &mut MatchEntity) {
        if let Some(goals) = self.goals_a {
            entity.goals_a = goals;
        }
        if let Some(goals) = self.goals_b {
            entity.goals_b = goals;
        }
        if let Some(closed) = self.closed {
            entity.closed = closed;
        }
        if let Some(penalties) = self.penalties {
            entity.penalties = Some(penalties);
        }
        if let Some(ended_in) = self.ended_in {
            entity.ended_in = Some(ended_in);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_column_names() {
        let raw = serde_json::json!({
            "id": "2f0e8a56-5b1c-4a44-9d1f-1a6f2b1c0a11",
            "chave_id": "7",
            "is_mata_mata": true,
            "etapa": "Semifinal",
            "perna": 2,
            "gols_time_a": 3,
            "gols_time_b": 1,
            "encerrada": true,
            "data_hora": "2025-03-09T15:30"
        });

        let entity: MatchEntity = serde_json::from_value(raw).unwrap();
        assert_eq!(entity.pairing_id.as_deref(), Some("7"));
        assert!(entity.is_elimination);
        assert_eq!(entity.stage.as_deref(), Some("Semifinal"));
        assert_eq!(entity.leg, Some(2));
        assert_eq!((entity.goals_a, entity.goals_b), (3, 1));
        assert!(entity.closed);
        assert!(entity.kickoff.is_some());
        assert!(entity.team_a.is_none());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let raw = serde_json::json!({ "id": "2f0e8a56-5b1c-4a44-9d1f-1a6f2b1c0a11", "goals_a": 2 });
        let mut entity: MatchEntity = serde_json::from_value(raw).unwrap();

        MatchPatch {
            goals_b: Some(4),
            closed: Some(true),
            ..MatchPatch::default()
        }
        .apply_to(&mut entity);

        assert_eq!((entity.goals_a, entity.goals_b), (2, 4));
        assert!(entity.closed);
        assert!(entity.penalties.is_none());
    }
}
