//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a goal adjustment is exactly one goal up or down.
///
/// # Examples
///
/// ```ignore
/// validate_goal_delta(&1)  // Ok
/// validate_goal_delta(&-1) // Ok
/// validate_goal_delta(&2)  // Err - one goal at a time
/// ```
pub fn validate_goal_delta(delta: i32) -> Result<(), ValidationError> {
    if delta == 1 || delta == -1 {
        return Ok(());
    }

    let mut err = ValidationError::new("goal_delta");
    err.message = Some(format!("Goal delta must be +1 or -1 (got {delta})").into());
    Err(err)
}

/// Validates that a layout metric is a finite, positive number.
pub fn validate_metric(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }

    let mut err = ValidationError::new("layout_metric");
    err.message = Some(format!("Layout metrics must be positive numbers (got {value})").into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_goal_delta() {
        assert!(validate_goal_delta(1).is_ok());
        assert!(validate_goal_delta(-1).is_ok());
        assert!(validate_goal_delta(0).is_err());
        assert!(validate_goal_delta(2).is_err());
        assert!(validate_goal_delta(-3).is_err());
    }

    #[test]
    fn test_validate_metric() {
        assert!(validate_metric(120.0).is_ok());
        assert!(validate_metric(0.0).is_err());
        assert!(validate_metric(-4.0).is_err());
        assert!(validate_metric(f64::NAN).is_err());
    }
}
