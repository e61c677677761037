mod config;
mod error;
mod models;
pub mod store;

pub use config::{ConnectRetry, MongoConfig};
pub use error::MongoDaoError;
pub use store::MongoMatchStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::MissingMatch { id } => StorageError::missing("match", id),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
