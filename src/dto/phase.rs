use serde::Serialize;
use utoipa::ToSchema;

use crate::state::match_clock::MatchPhase;

/// Match phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleMatchPhase {
    /// First regulation half.
    FirstHalf,
    /// Second regulation half.
    SecondHalf,
    /// First half of extra time.
    ExtraFirst,
    /// Second half of extra time.
    ExtraSecond,
    /// Penalty shoot-out.
    PenaltyShootout,
    /// Final result.
    Closed,
}

impl From<MatchPhase> for VisibleMatchPhase {
    fn from(value: MatchPhase) -> Self {
        match value {
            MatchPhase::FirstHalf => VisibleMatchPhase::FirstHalf,
            MatchPhase::SecondHalf => VisibleMatchPhase::SecondHalf,
            MatchPhase::ExtraFirst => VisibleMatchPhase::ExtraFirst,
            MatchPhase::ExtraSecond => VisibleMatchPhase::ExtraSecond,
            MatchPhase::PenaltyShootout => VisibleMatchPhase::PenaltyShootout,
            MatchPhase::Closed => VisibleMatchPhase::Closed,
        }
    }
}
