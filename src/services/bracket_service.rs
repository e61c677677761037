use tracing::debug;
use uuid::Uuid;

use crate::{
    bracket::{self, LayoutMetrics, Stage},
    dao::models::MatchFilter,
    dto::bracket::BracketResponse,
    error::ServiceError,
    services::access::owned_tournament,
    state::{OwnerSession, SharedState},
};

/// Build the bracket view of a tournament owned by `session`.
pub async fn bracket_for_tournament(
    state: &SharedState,
    session: OwnerSession,
    tournament_id: Uuid,
    metrics: LayoutMetrics,
) -> Result<BracketResponse, ServiceError> {
    let store = state.require_match_store().await?;
    let tournament = owned_tournament(store.as_ref(), session, tournament_id).await?;

    let matches = store
        .list_matches(
            tournament_id,
            MatchFilter {
                elimination_only: true,
            },
        )
        .await?;

    let entry_stage = Stage::entry_for_team_count(tournament.team_count);
    let layout = bracket::build_bracket(&matches, entry_stage, metrics);
    debug!(
        tournament_id = %tournament_id,
        matches = matches.len(),
        columns = layout.columns.len(),
        "bracket computed"
    );

    Ok(BracketResponse::from_layout(tournament_id, layout))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            match_store::{MatchStore, memory::MemoryMatchStore},
            models::{MatchEntity, TeamRef, TournamentEntity, TournamentFormat},
        },
        state::AppState,
    };

    fn team(name: &str) -> TeamRef {
        TeamRef {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: name.into(),
            primary_color: "#111111".into(),
            secondary_color: "#222222".into(),
            detail_color: "#333333".into(),
            crest_url: None,
        }
    }

    fn tournament(owner_id: Uuid, team_count: u32) -> TournamentEntity {
        TournamentEntity {
            id: Uuid::new_v4(),
            owner_id,
            name: "Copa".into(),
            format: TournamentFormat::Elimination,
            half_duration_minutes: 20,
            extra_time: false,
            extra_time_minutes: 5,
            penalty_kicks: 5,
            two_legged: true,
            team_count,
        }
    }

    fn leg(
        tournament_id: Uuid,
        pairing: &str,
        leg: u8,
        home: (&TeamRef, u32),
        away: (&TeamRef, u32),
    ) -> MatchEntity {
        let mut entity = MatchEntity::fixture(Some(tournament_id), home.0.clone(), away.0.clone());
        entity.pairing_id = Some(pairing.into());
        entity.is_elimination = true;
        entity.stage = Some("Semifinal".into());
        entity.leg = Some(leg);
        entity.goals_a = home.1;
        entity.goals_b = away.1;
        entity.closed = true;
        entity
    }

    async fn setup(
        team_count: u32,
    ) -> (crate::state::SharedState, OwnerSession, Uuid, Vec<TeamRef>) {
        let owner = OwnerSession::new(Uuid::new_v4());
        let store = MemoryMatchStore::new();
        let tournament = tournament(owner.owner_id, team_count);
        let teams: Vec<TeamRef> = ["X", "Y", "Z", "W"].iter().map(|n| team(n)).collect();

        store.save_tournament(tournament.clone()).await.unwrap();
        for entity in [
            leg(tournament.id, "1", 1, (&teams[0], 2), (&teams[1], 1)),
            leg(tournament.id, "1", 2, (&teams[1], 2), (&teams[0], 0)),
            leg(tournament.id, "2", 1, (&teams[2], 1), (&teams[3], 1)),
        ] {
            store.save_match(entity).await.unwrap();
        }

        let state = AppState::new(AppConfig::default());
        state.set_match_store(Arc::new(store)).await;
        (state, owner, tournament.id, teams)
    }

    #[tokio::test]
    async fn builds_bracket_with_aggregate_winner_and_placeholders() {
        let (state, owner, tournament_id, teams) = setup(8).await;

        let response =
            bracket_for_tournament(&state, owner, tournament_id, LayoutMetrics::default())
                .await
                .unwrap();

        let stages: Vec<&str> = response.columns.iter().map(|c| c.stage.as_str()).collect();
        assert_eq!(stages, ["quarterfinal", "semifinal", "final"]);
        assert_eq!(response.columns[0].slots.len(), 4);
        assert!(response.columns[0].slots.iter().all(|s| s.tie.is_none()));

        let first = response.columns[1].slots[0].tie.as_ref().unwrap();
        assert_eq!(first.pairing_id, "1");
        assert_eq!(first.winner, Some(teams[1].id));
        assert_eq!(first.aggregate.map(|a| (a.team1, a.team2)), Some((2, 3)));

        let second = response.columns[1].slots[1].tie.as_ref().unwrap();
        assert_eq!(second.winner, None);
        assert_eq!(second.legs.len(), 1);
        assert_eq!(response.connectors.len(), 4 + 2);
    }

    #[tokio::test]
    async fn other_owner_is_forbidden() {
        let (state, _, tournament_id, _) = setup(4).await;
        let stranger = OwnerSession::new(Uuid::new_v4());

        match bracket_for_tournament(&state, stranger, tournament_id, LayoutMetrics::default())
            .await
        {
            Err(ServiceError::Forbidden(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tournament_is_not_found() {
        let (state, owner, _, _) = setup(4).await;

        match bracket_for_tournament(&state, owner, Uuid::new_v4(), LayoutMetrics::default())
            .await
        {
            Err(ServiceError::NotFound(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
