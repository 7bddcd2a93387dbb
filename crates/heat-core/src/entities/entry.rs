use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntryKind;

/// A competing unit (athlete or team) holding a ticket in a competition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub competition_id: String,
    pub ticket_type_id: Option<String>,
    pub kind: EntryKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
