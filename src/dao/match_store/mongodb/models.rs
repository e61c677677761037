use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{MatchEntity, MatchPatch, TournamentEntity};

/// Match stored with its lookup keys hoisted next to the `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    tournament_id: Option<String>,
    is_elimination: bool,
    entity: MatchEntity,
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            tournament_id: value.tournament_id.map(|id| id.to_string()),
            is_elimination: value.is_elimination,
            entity: value,
        }
    }
}

impl From<MongoMatchDocument> for MatchEntity {
    fn from(value: MongoMatchDocument) -> Self {
        value.entity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTournamentDocument {
    #[serde(rename = "_id")]
    id: String,
    owner_id: String,
    entity: TournamentEntity,
}

impl MongoTournamentDocument {
    pub fn owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id.to_string()
    }
}

impl From<TournamentEntity> for MongoTournamentDocument {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            entity: value,
        }
    }
}

impl From<MongoTournamentDocument> for TournamentEntity {
    fn from(value: MongoTournamentDocument) -> Self {
        value.entity
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// Build the `$set` document for a partial match update.
pub fn patch_update(id: Uuid, patch: &MatchPatch) -> MongoResult<Document> {
    let mut set = Document::new();
    if let Some(goals) = patch.goals_a {
        set.insert("entity.goals_a", i64::from(goals));
    }
    if let Some(goals) = patch.goals_b {
        set.insert("entity.goals_b", i64::from(goals));
    }
    if let Some(closed) = patch.closed {
        set.insert("entity.closed", closed);
    }
    if let Some(penalties) = patch.penalties {
        let value = mongodb::bson::serialize_to_bson(&penalties)
            .map_err(|source| MongoDaoError::EncodePatch { id, source })?;
        set.insert("entity.penalties", value);
    }
    if let Some(ended_in) = patch.ended_in {
        let value = mongodb::bson::serialize_to_bson(&ended_in)
            .map_err(|source| MongoDaoError::EncodePatch { id, source })?;
        set.insert("entity.ended_in", value);
    }
    Ok(doc! {"$set": set})
}

pub fn reopen_update() -> Document {
    doc! {
        "$set": {
            "entity.closed": false,
            "entity.penalties": Bson::Null,
            "entity.ended_in": Bson::Null,
        }
    }
}
