use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoMatchDocument, MongoTournamentDocument, doc_id, patch_update, reopen_update,
    },
};
use crate::dao::{
    match_store::{MatchStore, sort_matches},
    models::{MatchEntity, MatchFilter, MatchPatch, TournamentEntity, TournamentLookup},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const TOURNAMENT_COLLECTION_NAME: &str = "tournaments";

#[derive(Clone)]
pub struct MongoMatchStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = self.config.open().await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoMatchStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = config.open().await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.matches().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"tournament_id": 1, "is_elimination": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_tournament_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "tournament_id,is_elimination",
                source,
            })?;

        Ok(())
    }

    async fn matches(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn tournaments(&self) -> Collection<MongoTournamentDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoTournamentDocument>(TOURNAMENT_COLLECTION_NAME)
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .matches()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_matches(
        &self,
        tournament_id: Uuid,
        filter: MatchFilter,
    ) -> MongoResult<Vec<MatchEntity>> {
        let mut query = doc! {"tournament_id": tournament_id.to_string()};
        if filter.elimination_only {
            query.insert("is_elimination", true);
        }

        let documents: Vec<MongoMatchDocument> = self
            .matches()
            .await
            .find(query)
            .await
            .map_err(|source| MongoDaoError::ListMatches {
                tournament_id,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches {
                tournament_id,
                source,
            })?;

        let mut matches: Vec<MatchEntity> = documents.into_iter().map(Into::into).collect();
        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn update_match(&self, id: Uuid, patch: MatchPatch) -> MongoResult<()> {
        let update = patch_update(id, &patch)?;
        let result = self
            .matches()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;

        if result.matched_count == 0 {
            return Err(MongoDaoError::MissingMatch { id });
        }
        Ok(())
    }

    async fn reopen_match(&self, id: Uuid) -> MongoResult<()> {
        let result = self
            .matches()
            .await
            .update_one(doc_id(id), reopen_update())
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;

        if result.matched_count == 0 {
            return Err(MongoDaoError::MissingMatch { id });
        }
        Ok(())
    }

    async fn find_tournament(&self, id: Uuid, owner_id: Uuid) -> MongoResult<TournamentLookup> {
        let document = self
            .tournaments()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadTournament { id, source })?;

        Ok(match document {
            Some(document) if document.owned_by(owner_id) => {
                TournamentLookup::Found(document.into())
            }
            Some(_) => TournamentLookup::Forbidden,
            None => TournamentLookup::NotFound,
        })
    }

    async fn save_match(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoMatchDocument = entity.into();
        self.matches()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn save_tournament(&self, entity: TournamentEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoTournamentDocument = entity.into();
        self.tournaments()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveTournament { id, source })?;
        Ok(())
    }
}

impl MatchStore for MongoMatchStore {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn list_matches(
        &self,
        tournament_id: Uuid,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_matches(tournament_id, filter)
                .await
                .map_err(Into::into)
        })
    }

    fn update_match(&self, id: Uuid, patch: MatchPatch) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.update_match(id, patch).await.map_err(Into::into) })
    }

    fn reopen_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reopen_match(id).await.map_err(Into::into) })
    }

    fn find_tournament(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<TournamentLookup>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_tournament(id, owner_id)
                .await
                .map_err(Into::into)
        })
    }

    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_match(entity).await.map_err(Into::into) })
    }

    fn save_tournament(&self, entity: TournamentEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_tournament(entity).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
