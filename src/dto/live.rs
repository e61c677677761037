//! Requests and responses of the live-play API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{common::LiveSnapshot, validation::validate_goal_delta},
    state::{match_clock::Side, rules::FriendlyPolicy},
};

/// Open an ad-hoc match that is never persisted.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct FriendlyRequest {
    /// What happens when the match is level after regulation.
    #[serde(default)]
    pub policy: FriendlyPolicy,
    /// Overrides the configured half length.
    #[validate(range(min = 1, max = 90))]
    pub half_duration_minutes: Option<u32>,
    /// Overrides the configured extra-time half length.
    #[validate(range(min = 1, max = 30))]
    pub extra_time_minutes: Option<u32>,
    /// Overrides the configured number of regulation penalty kicks.
    #[validate(range(min = 1, max = 10))]
    pub penalty_kicks: Option<u8>,
}

/// Add or remove one goal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoalRequest {
    /// Team whose score changes.
    pub side: Side,
    /// `1` to add a goal, `-1` to remove one.
    pub delta: i32,
}

impl Validate for GoalRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_goal_delta(self.delta) {
            errors.add("delta", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// End the current period ahead of the countdown.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PeriodEndRequest {
    /// Must be `true`; anything else leaves the match untouched.
    #[serde(default)]
    pub confirm: bool,
}

/// Record one shoot-out kick.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PenaltyRequest {
    /// Team taking the kick.
    pub side: Side,
    /// Whether the kick was scored.
    pub converted: bool,
}

/// Result of a live-play action.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveActionResponse {
    /// Session state after the action.
    pub snapshot: LiveSnapshot,
    /// Outcome of the storage write triggered by the action, absent when nothing was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_durations_are_bounded() {
        let request = FriendlyRequest {
            half_duration_minutes: Some(91),
            ..FriendlyRequest::default()
        };
        assert!(request.validate().is_err());

        let request = FriendlyRequest {
            half_duration_minutes: Some(45),
            extra_time_minutes: Some(15),
            penalty_kicks: Some(3),
            ..FriendlyRequest::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn goal_request_accepts_single_steps() {
        let request: GoalRequest =
            serde_json::from_value(serde_json::json!({ "side": "b", "delta": -1 })).unwrap();
        assert_eq!(request.side, Side::B);
        assert!(request.validate().is_ok());

        let request = GoalRequest {
            side: Side::A,
            delta: 2,
        };
        assert!(request.validate().is_err());
    }
}
