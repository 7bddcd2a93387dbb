use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A time slot inside a workout in which a bounded number of entries compete.
///
/// Heats of a workout are totally ordered by `(start_time, sequence, id)`.
/// `sequence` is assigned at insertion and only breaks start-time ties; the
/// rank in that order is the heat's *index*. Heats sharing an index across the
/// workouts of one competition are linked and share `max_limit_per_heat`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Heat {
    pub id: String,
    pub workout_id: String,
    pub start_time: DateTime<Utc>,
    pub sequence: i64,
    pub max_limit_per_heat: i64,
    pub created_at: DateTime<Utc>,
}
