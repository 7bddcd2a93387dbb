use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Registration ticket. Volunteer tickets never get heat eligibility.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TicketType {
    pub id: String,
    pub competition_id: String,
    pub name: String,
    pub team_size: i64,
    pub is_volunteer: bool,
}
