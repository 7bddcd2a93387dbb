//! Input types accepted by scheduling operations.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One heat to create inside a workout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewHeat {
    pub workout_id: String,
    pub start_time: DateTime<Utc>,
}

/// One item of a batch capacity update.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CapacityChange {
    pub heat_id: String,
    pub max_entries: i64,
}

impl CapacityChange {
    /// Reject capacities below one.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when `max_entries < 1`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_capacity(self.max_entries)
    }
}

/// Capacity shared by a round of linked heats must allow at least one lane.
///
/// # Errors
///
/// Returns `CoreError::Validation` when `limit < 1`.
pub fn validate_capacity(limit: i64) -> Result<(), CoreError> {
    if limit < 1 {
        return Err(CoreError::Validation(format!(
            "max limit per heat must be at least 1, got {limit}"
        )));
    }
    Ok(())
}
