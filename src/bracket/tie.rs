//! Grouping of matches into ties and the winner/aggregate decision.

use std::cmp::Ordering;

use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::{
    bracket::stage::{StageKey, canonicalize},
    dao::models::{MatchEntity, TeamRef},
};

/// One confrontation: up to two legs sharing a pairing id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tie {
    /// Pairing id, or the match id for ties without one.
    pub pairing_id: String,
    /// Normalized stage of the tie.
    pub stage: StageKey,
    /// Leg 1, or the only match of a single-leg tie.
    pub leg1: Option<MatchEntity>,
    /// Leg 2 of a two-legged tie.
    pub leg2: Option<MatchEntity>,
}

/// Goals of one leg, mapped onto the tie's `team1` and `team2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegScore {
    /// Leg number (1 or 2).
    pub leg: u8,
    /// Match id of the leg.
    pub match_id: Uuid,
    /// Goals of team 1; `None` while the leg is pending or the team is not found in it.
    pub team1: Option<u32>,
    /// Goals of team 2; `None` while the leg is pending or the team is not found in it.
    pub team2: Option<u32>,
}

impl LegScore {
    fn is_resolved(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }
}

/// How the winner of a tie was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecidedBy {
    /// Higher aggregate score.
    Aggregate,
    /// Level aggregate broken by the shoot-out of the last leg.
    Penalties,
}

/// Derived participants, scores and winner of a tie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TieOutcome {
    /// First participant found across the legs.
    pub team1: Option<TeamRef>,
    /// The other participant.
    pub team2: Option<TeamRef>,
    /// Per-leg normalized scores, in leg order.
    pub legs: Vec<LegScore>,
    /// Aggregate of team 1 and team 2 once every leg is closed.
    pub aggregate: Option<(u32, u32)>,
    /// Shoot-out goals of team 1 and team 2 from the deciding leg.
    pub penalties: Option<(u32, u32)>,
    /// Winning team.
    pub winner: Option<Uuid>,
    /// How the winner was determined.
    pub decided_by: Option<DecidedBy>,
}

impl Tie {
    /// Legs present, in leg order.
    pub fn legs(&self) -> impl Iterator<Item = &MatchEntity> {
        self.leg1.iter().chain(self.leg2.iter())
    }

    /// Identifiers of every team appearing in either leg.
    pub fn team_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(2);
        for id in self
            .legs()
            .flat_map(|leg| [leg.team_a_id(), leg.team_b_id()])
            .flatten()
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Resolve participants, per-leg scores, aggregate and winner.
    pub fn outcome(&self) -> TieOutcome {
        if self.leg1.is_none() && self.leg2.is_none() {
            return TieOutcome::default();
        }

        let teams = self.participants();
        let team1 = teams.first().cloned();
        let team2 = teams.get(1).cloned();
        let team1_id = team1.as_ref().map(|team| team.id);
        let team2_id = team2.as_ref().map(|team| team.id);

        let legs: Vec<LegScore> = [(1u8, self.leg1.as_ref()), (2u8, self.leg2.as_ref())]
            .into_iter()
            .filter_map(|(number, leg)| {
                leg.map(|leg| normalize_leg(number, leg, team1_id, team2_id))
            })
            .collect();

        let mut outcome = TieOutcome {
            team1,
            team2,
            legs,
            ..TieOutcome::default()
        };

        let (Some(team1_id), Some(team2_id)) = (team1_id, team2_id) else {
            return outcome;
        };
        if !outcome.legs.iter().all(LegScore::is_resolved) {
            return outcome;
        }

        let aggregate = outcome.legs.iter().fold((0, 0), |(a, b), leg| {
            (a + leg.team1.unwrap_or(0), b + leg.team2.unwrap_or(0))
        });
        outcome.aggregate = Some(aggregate);

        let deciding_leg = self.leg2.as_ref().or(self.leg1.as_ref());
        outcome.penalties = deciding_leg.and_then(|leg| {
            Some((
                leg.penalty_goals_for(team1_id)?,
                leg.penalty_goals_for(team2_id)?,
            ))
        });

        let (winner, decided_by) = match aggregate.0.cmp(&aggregate.1) {
            Ordering::Greater => (Some(team1_id), Some(DecidedBy::Aggregate)),
            Ordering::Less => (Some(team2_id), Some(DecidedBy::Aggregate)),
            Ordering::Equal => match outcome.penalties.map(|(a, b)| a.cmp(&b)) {
                Some(Ordering::Greater) => (Some(team1_id), Some(DecidedBy::Penalties)),
                Some(Ordering::Less) => (Some(team2_id), Some(DecidedBy::Penalties)),
                _ => (None, None),
            },
        };
        outcome.winner = winner;
        outcome.decided_by = decided_by;
        outcome
    }

    /// Distinct teams in the order they first appear across the legs.
    fn participants(&self) -> Vec<TeamRef> {
        let mut teams: Vec<TeamRef> = Vec::with_capacity(2);
        for team in self
            .legs()
            .flat_map(|leg| [leg.team_a.as_ref(), leg.team_b.as_ref()])
            .flatten()
        {
            if teams.len() == 2 {
                break;
            }
            if teams.iter().all(|known| known.id != team.id) {
                teams.push(team.clone());
            }
        }
        teams
    }
}

fn normalize_leg(
    number: u8,
    leg: &MatchEntity,
    team1: Option<Uuid>,
    team2: Option<Uuid>,
) -> LegScore {
    let goals = |team: Option<Uuid>| {
        if leg.closed {
            team.and_then(|id| leg.goals_for(id))
        } else {
            None
        }
    };

    LegScore {
        leg: number,
        match_id: leg.id,
        team1: goals(team1),
        team2: goals(team2),
    }
}

/// Group matches into ties by pairing id, keeping first-seen order.
pub fn group_ties(matches: &[MatchEntity]) -> Vec<Tie> {
    let mut ties: IndexMap<String, Tie> = IndexMap::new();

    for entity in matches {
        let pairing_id = entity
            .pairing_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| entity.id.to_string());

        let tie = ties.entry(pairing_id.clone()).or_insert_with(|| Tie {
            pairing_id,
            stage: canonicalize(entity.stage.as_deref().unwrap_or_default()),
            leg1: None,
            leg2: None,
        });

        let slot = if entity.leg == Some(2) {
            &mut tie.leg2
        } else {
            &mut tie.leg1
        };
        match slot {
            Some(existing) => debug!(
                pairing_id = %tie.pairing_id,
                kept = %existing.id,
                ignored = %entity.id,
                "duplicate leg in tie; keeping the first one"
            ),
            None => *slot = Some(entity.clone()),
        }
    }

    ties.into_values().collect()
}

/// Order pairing ids numerically when both parse, as strings otherwise.
pub fn compare_pairing_ids(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<u64>(), right.trim().parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => left.cmp(right),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dao::models::PenaltyRecord;

    pub(crate) fn team(name: &str) -> TeamRef {
        TeamRef {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: name.chars().take(3).collect(),
            primary_color: "#ffffff".into(),
            secondary_color: "#000000".into(),
            detail_color: "#ff0000".into(),
            crest_url: None,
        }
    }

    pub(crate) fn played(
        pairing: &str,
        stage: &str,
        leg: Option<u8>,
        home: (&TeamRef, u32),
        away: (&TeamRef, u32),
    ) -> MatchEntity {
        let mut entity = MatchEntity::fixture(None, home.0.clone(), away.0.clone());
        entity.pairing_id = Some(pairing.into());
        entity.stage = Some(stage.into());
        entity.is_elimination = true;
        entity.leg = leg;
        entity.goals_a = home.1;
        entity.goals_b = away.1;
        entity.closed = true;
        entity
    }

    #[test]
    fn two_legged_aggregate_with_swapped_sides() {
        let x = team("X");
        let y = team("Y");
        let leg1 = played("1", "Semifinal", Some(1), (&x, 2), (&y, 1));
        let leg2 = played("1", "Semifinal", Some(2), (&y, 2), (&x, 0));

        let ties = group_ties(&[leg2, leg1]);
        assert_eq!(ties.len(), 1);
        let outcome = ties[0].outcome();

        assert_eq!(outcome.team1.as_ref().map(|t| t.id), Some(x.id));
        assert_eq!(outcome.aggregate, Some((2, 3)));
        assert_eq!(outcome.winner, Some(y.id));
        assert_eq!(outcome.decided_by, Some(DecidedBy::Aggregate));
        assert_eq!(outcome.legs[0].team1, Some(2));
        assert_eq!(outcome.legs[1].team1, Some(0));
        assert_eq!(outcome.legs[1].team2, Some(2));
    }

    #[test]
    fn level_aggregate_falls_back_to_second_leg_penalties() {
        let x = team("X");
        let y = team("Y");
        let leg1 = played("4", "Final", Some(1), (&x, 1), (&y, 0));
        let mut leg2 = played("4", "Final", Some(2), (&y, 1), (&x, 0));
        leg2.penalties = Some(PenaltyRecord {
            goals_a: 4,
            goals_b: 5,
            misses_a: 1,
            misses_b: 0,
        });

        let outcome = group_ties(&[leg1, leg2])[0].outcome();
        assert_eq!(outcome.aggregate, Some((1, 1)));
        assert_eq!(outcome.penalties, Some((5, 4)));
        assert_eq!(outcome.winner, Some(x.id));
        assert_eq!(outcome.decided_by, Some(DecidedBy::Penalties));
    }

    #[test]
    fn level_aggregate_without_penalties_has_no_winner() {
        let x = team("X");
        let y = team("Y");
        let leg1 = played("2", "Final", Some(1), (&x, 1), (&y, 1));
        let leg2 = played("2", "Final", Some(2), (&y, 0), (&x, 0));

        let outcome = group_ties(&[leg1, leg2])[0].outcome();
        assert_eq!(outcome.aggregate, Some((1, 1)));
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.decided_by, None);
    }

    #[test]
    fn pending_leg_blocks_the_decision() {
        let x = team("X");
        let y = team("Y");
        let leg1 = played("3", "Final", Some(1), (&x, 3), (&y, 0));
        let mut leg2 = played("3", "Final", Some(2), (&y, 0), (&x, 0));
        leg2.closed = false;

        let outcome = group_ties(&[leg1, leg2])[0].outcome();
        assert_eq!(outcome.legs[0].team1, Some(3));
        assert_eq!(outcome.legs[1].team1, None);
        assert_eq!(outcome.aggregate, None);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn single_leg_uses_its_own_penalties() {
        let x = team("X");
        let y = team("Y");
        let mut only = played("9", "Final", None, (&x, 2), (&y, 2));
        only.penalties = Some(PenaltyRecord {
            goals_a: 3,
            goals_b: 1,
            misses_a: 0,
            misses_b: 2,
        });

        let outcome = group_ties(&[only])[0].outcome();
        assert_eq!(outcome.winner, Some(x.id));
        assert_eq!(outcome.decided_by, Some(DecidedBy::Penalties));
    }

    #[test]
    fn aggregate_winner_matches_goal_totals() {
        for (a1, b1, a2, b2) in [(0, 0, 1, 0), (3, 1, 0, 2), (2, 2, 2, 3), (1, 4, 4, 0)] {
            let x = team("X");
            let y = team("Y");
            let leg1 = played("1", "Final", Some(1), (&x, a1), (&y, b1));
            let leg2 = played("1", "Final", Some(2), (&y, b2), (&x, a2));
            let outcome = group_ties(&[leg1, leg2])[0].outcome();

            let expected = match (a1 + a2).cmp(&(b1 + b2)) {
                Ordering::Greater => Some(x.id),
                Ordering::Less => Some(y.id),
                Ordering::Equal => None,
            };
            assert_eq!(outcome.winner, expected, "legs {a1}-{b1} / {a2}-{b2}");
        }
    }

    #[test]
    fn missing_pairing_id_makes_a_singleton_tie() {
        let x = team("X");
        let y = team("Y");
        let mut first = played("", "Final", None, (&x, 1), (&y, 0));
        first.pairing_id = None;
        let mut second = first.clone();
        second.id = Uuid::new_v4();

        let ties = group_ties(&[first.clone(), second]);
        assert_eq!(ties.len(), 2);
        assert_eq!(ties[0].pairing_id, first.id.to_string());
    }

    #[test]
    fn pairing_ids_compare_numerically_when_possible() {
        assert_eq!(compare_pairing_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_pairing_ids("b", "a"), Ordering::Greater);
        assert_eq!(compare_pairing_ids("10", "a"), Ordering::Less);
    }
}
