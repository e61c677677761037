pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{MatchEntity, MatchFilter, MatchPatch, TournamentEntity, TournamentLookup};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for matches and tournaments.
pub trait MatchStore: Send + Sync {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn list_matches(
        &self,
        tournament_id: Uuid,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn update_match(&self, id: Uuid, patch: MatchPatch) -> BoxFuture<'static, StorageResult<()>>;
    fn reopen_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    fn find_tournament(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<TournamentLookup>>;
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn save_tournament(&self, entity: TournamentEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Ordering shared by every backend for `list_matches`.
pub(crate) fn sort_matches(matches: &mut [MatchEntity]) {
    matches.sort_by(|left, right| {
        left.stage
            .cmp(&right.stage)
            .then_with(|| left.pairing_id.cmp(&right.pairing_id))
            .then_with(|| left.leg.cmp(&right.leg))
            .then_with(|| left.id.cmp(&right.id))
    });
}

/// Clear closure and every result marker derived from it.
pub(crate) fn reopened(mut entity: MatchEntity) -> MatchEntity {
    entity.closed = false;
    entity.penalties = None;
    entity.ended_in = None;
    entity
}
