use uuid::Uuid;

use crate::{
    dao::{
        match_store::MatchStore,
        models::{TournamentEntity, TournamentLookup},
    },
    error::ServiceError,
    state::OwnerSession,
};

/// Load a tournament and check it belongs to the session's owner.
pub async fn owned_tournament(
    store: &dyn MatchStore,
    session: OwnerSession,
    tournament_id: Uuid,
) -> Result<TournamentEntity, ServiceError> {
    match store
        .find_tournament(tournament_id, session.owner_id)
        .await?
    {
        TournamentLookup::Found(tournament) => Ok(tournament),
        TournamentLookup::NotFound => Err(ServiceError::NotFound(format!(
            "tournament `{tournament_id}`"
        ))),
        TournamentLookup::Forbidden => Err(ServiceError::Forbidden(format!(
            "tournament `{tournament_id}` belongs to another owner"
        ))),
    }
}
