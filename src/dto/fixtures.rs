//! Tournament and match records imported in bulk.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dao::models::{MatchEntity, TournamentEntity};

/// Tournaments and matches to store, in the storage record shape.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FixtureBundle {
    /// Tournaments to create or replace.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub tournaments: Vec<TournamentEntity>,
    /// Matches to create or replace.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub matches: Vec<MatchEntity>,
}

impl Validate for FixtureBundle {
    fn validate(&self) -> Result<(), ValidationErrors> {
        for tournament in &self.tournaments {
            tournament.validate()?;
        }
        Ok(())
    }
}

/// Number of records written by an import.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Tournaments written.
    pub tournaments: usize,
    /// Matches written.
    pub matches: usize,
}
