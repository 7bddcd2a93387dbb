use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Placement of one entry at one numbered position of one heat.
///
/// Lane numbers of a heat with `k` lanes are exactly `1..=k`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Lane {
    pub id: String,
    pub heat_id: String,
    pub entry_id: String,
    pub number: i64,
    pub created_at: DateTime<Utc>,
}
