use std::{collections::HashSet, fs, path::Path};

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        match_store::MatchStore,
        models::TournamentLookup,
        storage::StorageResult,
    },
    dto::fixtures::{FixtureBundle, ImportSummary},
    error::ServiceError,
    services::access::owned_tournament,
    state::{OwnerSession, SharedState},
};

/// Read and validate a fixture bundle from disk.
pub fn read_bundle(path: &Path) -> Result<FixtureBundle, ServiceError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        ServiceError::InvalidInput(format!("cannot read fixtures `{}`: {err}", path.display()))
    })?;
    let bundle: FixtureBundle = serde_json::from_str(&contents).map_err(|err| {
        ServiceError::InvalidInput(format!("cannot parse fixtures `{}`: {err}", path.display()))
    })?;
    bundle
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    Ok(bundle)
}

/// Write every record of `bundle`, tournaments first. Existing records with the same id are
/// replaced.
pub async fn seed(store: &dyn MatchStore, bundle: &FixtureBundle) -> StorageResult<ImportSummary> {
    for tournament in &bundle.tournaments {
        store.save_tournament(tournament.clone()).await?;
    }
    for entity in &bundle.matches {
        store.save_match(entity.clone()).await?;
    }

    let summary = ImportSummary {
        tournaments: bundle.tournaments.len(),
        matches: bundle.matches.len(),
    };
    info!(
        tournaments = summary.tournaments,
        matches = summary.matches,
        "fixtures imported"
    );
    Ok(summary)
}

/// Import `bundle` on behalf of `session`.
///
/// Every tournament must belong to the owner and must not replace another owner's tournament.
/// Every match must point at a tournament of the bundle or at one the owner already has.
pub async fn import_for_owner(
    state: &SharedState,
    session: OwnerSession,
    bundle: FixtureBundle,
) -> Result<ImportSummary, ServiceError> {
    bundle
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let store = state.require_match_store().await?;

    let mut owned: HashSet<Uuid> = HashSet::new();
    for tournament in &bundle.tournaments {
        if tournament.owner_id != session.owner_id {
            return Err(ServiceError::Forbidden(format!(
                "tournament `{}` is declared for another owner",
                tournament.id
            )));
        }
        if store
            .find_tournament(tournament.id, session.owner_id)
            .await?
            == TournamentLookup::Forbidden
        {
            return Err(ServiceError::Forbidden(format!(
                "tournament `{}` belongs to another owner",
                tournament.id
            )));
        }
        owned.insert(tournament.id);
    }

    for entity in &bundle.matches {
        let tournament_id = entity.tournament_id.ok_or_else(|| {
            ServiceError::InvalidInput(format!("match `{}` has no tournament", entity.id))
        })?;
        if !owned.contains(&tournament_id) {
            owned_tournament(store.as_ref(), session, tournament_id).await?;
            owned.insert(tournament_id);
        }
        if let Some(existing) = store.find_match(entity.id).await? {
            let foreign = match existing.tournament_id {
                Some(id) if owned.contains(&id) => false,
                Some(id) => owned_tournament(store.as_ref(), session, id).await.is_err(),
                None => true,
            };
            if foreign {
                return Err(ServiceError::Forbidden(format!(
                    "match `{}` belongs to another owner",
                    entity.id
                )));
            }
        }
    }

    Ok(seed(store.as_ref(), &bundle).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            match_store::memory::MemoryMatchStore,
            models::{MatchEntity, TeamRef, TournamentEntity, TournamentFormat},
        },
        services::live_service,
        state::AppState,
    };

    fn team(name: &str) -> TeamRef {
        TeamRef {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: name.into(),
            primary_color: "#ffffff".into(),
            secondary_color: "#000000".into(),
            detail_color: "#ff0000".into(),
            crest_url: None,
        }
    }

    fn tournament(owner_id: Uuid) -> TournamentEntity {
        TournamentEntity {
            id: Uuid::new_v4(),
            owner_id,
            name: "Copa".into(),
            format: TournamentFormat::Elimination,
            half_duration_minutes: 10,
            extra_time: false,
            extra_time_minutes: 5,
            penalty_kicks: 5,
            two_legged: false,
            team_count: 2,
        }
    }

    fn bundle(owner_id: Uuid) -> FixtureBundle {
        let tournament = tournament(owner_id);
        let mut entity = MatchEntity::fixture(Some(tournament.id), team("Alpha"), team("Bravo"));
        entity.is_elimination = true;
        entity.stage = Some("Final".into());
        FixtureBundle {
            tournaments: vec![tournament],
            matches: vec![entity],
        }
    }

    async fn state_with(store: &MemoryMatchStore) -> SharedState {
        let state = AppState::new(AppConfig::default());
        state.set_match_store(Arc::new(store.clone())).await;
        state
    }

    #[test]
    fn reads_a_bundle_from_disk() {
        let owner_id = Uuid::new_v4();
        let path = std::env::temp_dir().join(format!("fixtures-{}.json", Uuid::new_v4()));
        let raw = serde_json::json!({
            "tournaments": [{
                "id": Uuid::new_v4(),
                "owner_id": owner_id,
                "name": "Copa",
                "format": "elimination",
                "half_duration_minutes": 20,
                "extra_time": true,
                "extra_time_minutes": 5,
                "penalty_kicks": 5,
                "two_legged": false
            }],
            "matches": [{ "id": Uuid::new_v4(), "etapa": "Final", "is_mata_mata": true }]
        });
        fs::write(&path, raw.to_string()).unwrap();

        let bundle = read_bundle(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(bundle.tournaments.len(), 1);
        assert_eq!(bundle.tournaments[0].owner_id, owner_id);
        assert_eq!(bundle.matches[0].stage.as_deref(), Some("Final"));
    }

    #[test]
    fn shipped_fixtures_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/fixtures.json");
        let bundle = read_bundle(&path).unwrap();
        assert_eq!(bundle.tournaments.len(), 1);
        assert_eq!(bundle.matches.len(), 2);
        assert!(bundle.matches.iter().all(|entity| entity.kickoff.is_some()));
    }

    #[test]
    fn invalid_tournament_settings_are_rejected() {
        let path = std::env::temp_dir().join(format!("fixtures-{}.json", Uuid::new_v4()));
        let mut broken = tournament(Uuid::new_v4());
        broken.penalty_kicks = 0;
        let raw = serde_json::json!({ "tournaments": [broken] });
        fs::write(&path, raw.to_string()).unwrap();

        let result = read_bundle(&path);
        fs::remove_file(&path).unwrap();
        match result {
            Err(ServiceError::InvalidInput(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        match read_bundle(Path::new("/nonexistent/fixtures.json")) {
            Err(ServiceError::InvalidInput(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn seeded_match_can_be_opened() {
        let owner = OwnerSession::new(Uuid::new_v4());
        let store = MemoryMatchStore::new();
        let bundle = bundle(owner.owner_id);
        let match_id = bundle.matches[0].id;

        let summary = seed(&store, &bundle).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                tournaments: 1,
                matches: 1
            }
        );

        let state = state_with(&store).await;
        let opened = live_service::open_match(&state, owner, match_id)
            .await
            .unwrap();
        assert_eq!(opened.seconds_remaining, 600);
    }

    #[tokio::test]
    async fn owner_import_stores_records() {
        let owner = OwnerSession::new(Uuid::new_v4());
        let store = MemoryMatchStore::new();
        let state = state_with(&store).await;
        let bundle = bundle(owner.owner_id);
        let match_id = bundle.matches[0].id;

        import_for_owner(&state, owner, bundle).await.unwrap();
        assert!(store.get(match_id).is_some());
    }

    #[tokio::test]
    async fn owner_import_cannot_touch_other_owners() {
        let owner = OwnerSession::new(Uuid::new_v4());
        let stranger = OwnerSession::new(Uuid::new_v4());
        let store = MemoryMatchStore::new();
        let state = state_with(&store).await;

        match import_for_owner(&state, owner, bundle(stranger.owner_id)).await {
            Err(ServiceError::Forbidden(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }

        let theirs = bundle(stranger.owner_id);
        seed(&store, &theirs).await.unwrap();

        let mut takeover = theirs.tournaments[0].clone();
        takeover.owner_id = owner.owner_id;
        let replace_tournament = FixtureBundle {
            tournaments: vec![takeover],
            matches: Vec::new(),
        };
        match import_for_owner(&state, owner, replace_tournament).await {
            Err(ServiceError::Forbidden(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }

        let into_theirs = FixtureBundle {
            tournaments: Vec::new(),
            matches: vec![MatchEntity::fixture(
                Some(theirs.tournaments[0].id),
                team("Charlie"),
                team("Delta"),
            )],
        };
        match import_for_owner(&state, owner, into_theirs).await {
            Err(ServiceError::Forbidden(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }

        let mine = bundle(owner.owner_id);
        let mut hijack = theirs.matches[0].clone();
        hijack.tournament_id = Some(mine.tournaments[0].id);
        let move_their_match = FixtureBundle {
            tournaments: mine.tournaments,
            matches: vec![hijack],
        };
        match import_for_owner(&state, owner, move_their_match).await {
            Err(ServiceError::Forbidden(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn import_needs_storage() {
        let state = AppState::new(AppConfig::default());
        let owner = OwnerSession::new(Uuid::new_v4());

        match import_for_owner(&state, owner, bundle(owner.owner_id)).await {
            Err(ServiceError::Degraded) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
