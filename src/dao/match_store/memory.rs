//! In-process store used when no database is configured and by the test suites.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use super::{MatchStore, reopened, sort_matches};
use crate::dao::{
    models::{MatchEntity, MatchFilter, MatchPatch, TournamentEntity, TournamentLookup},
    storage::{StorageError, StorageResult},
};

/// DashMap-backed [`MatchStore`]; cloning shares the same maps.
#[derive(Clone, Default)]
pub struct MemoryMatchStore {
    matches: Arc<DashMap<Uuid, MatchEntity>>,
    tournaments: Arc<DashMap<Uuid, TournamentEntity>>,
    offline: Arc<AtomicBool>,
}

impl MemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a match synchronously, mostly useful in tests.
    pub fn get(&self, id: Uuid) -> Option<MatchEntity> {
        self.matches.get(&id).map(|entry| entry.clone())
    }

    /// Simulate an outage: writes and health checks fail while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store offline".into(),
                io::Error::new(io::ErrorKind::NotConnected, "offline"),
            ));
        }
        Ok(())
    }

    fn list(&self, tournament_id: Uuid, filter: MatchFilter) -> Vec<MatchEntity> {
        let mut matches: Vec<MatchEntity> = self
            .matches
            .iter()
            .filter(|entry| entry.tournament_id == Some(tournament_id))
            .filter(|entry| !filter.elimination_only || entry.is_elimination)
            .map(|entry| entry.clone())
            .collect();
        sort_matches(&mut matches);
        matches
    }

    fn update(&self, id: Uuid, patch: &MatchPatch) -> StorageResult<()> {
        self.ensure_online()?;
        let mut entry = self
            .matches
            .get_mut(&id)
            .ok_or_else(|| StorageError::missing("match", id))?;
        patch.apply_to(&mut entry);
        Ok(())
    }

    fn reopen(&self, id: Uuid) -> StorageResult<()> {
        self.ensure_online()?;
        let mut entry = self
            .matches
            .get_mut(&id)
            .ok_or_else(|| StorageError::missing("match", id))?;
        let current = entry.value().clone();
        *entry = reopened(current);
        Ok(())
    }

    fn lookup(&self, id: Uuid, owner_id: Uuid) -> TournamentLookup {
        match self.tournaments.get(&id) {
            Some(entry) if entry.owner_id == owner_id => TournamentLookup::Found(entry.clone()),
            Some(_) => TournamentLookup::Forbidden,
            None => TournamentLookup::NotFound,
        }
    }
}

impl MatchStore for MemoryMatchStore {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let found = self.get(id);
        Box::pin(async move { Ok(found) })
    }

    fn list_matches(
        &self,
        tournament_id: Uuid,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let matches = self.list(tournament_id, filter);
        Box::pin(async move { Ok(matches) })
    }

    fn update_match(&self, id: Uuid, patch: MatchPatch) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.update(id, &patch);
        Box::pin(async move { result })
    }

    fn reopen_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.reopen(id);
        Box::pin(async move { result })
    }

    fn find_tournament(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<TournamentLookup>> {
        let lookup = self.lookup(id, owner_id);
        Box::pin(async move { Ok(lookup) })
    }

    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.matches.insert(entity.id, entity);
        Box::pin(async { Ok(()) })
    }

    fn save_tournament(&self, entity: TournamentEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tournaments.insert(entity.id, entity);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.ensure_online();
        Box::pin(async move { result })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
