use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load match `{id}`")]
    LoadMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list matches of tournament `{tournament_id}`")]
    ListMatches {
        tournament_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save match `{id}`")]
    SaveMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to update match `{id}`")]
    UpdateMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("match `{id}` does not exist")]
    MissingMatch { id: Uuid },
    #[error("failed to encode update for match `{id}`")]
    EncodePatch {
        id: Uuid,
        #[source]
        source: mongodb::bson::error::Error,
    },
    #[error("failed to load tournament `{id}`")]
    LoadTournament {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save tournament `{id}`")]
    SaveTournament {
        id: Uuid,
        #[source]
        source: MongoError,
    },
}
