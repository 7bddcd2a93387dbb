use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One workout of a competition. Its heats are ordered by start time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Workout {
    pub id: String,
    pub competition_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
