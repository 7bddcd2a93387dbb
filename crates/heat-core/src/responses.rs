//! Result shapes returned by scheduling operations and the `heat` CLI.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Heat, Lane};
use crate::enums::HeatState;

/// Per-item result of a batch capacity update.
///
/// `heats` lists every linked heat that received the new limit when the item
/// succeeded; `error` carries the message when it did not.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CapacityOutcome {
    pub heat_id: String,
    pub max_entries: i64,
    pub heats: Vec<Heat>,
    pub error: Option<String>,
}

impl CapacityOutcome {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Lane count of a heat against its capacity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HeatOccupancy {
    pub heat_id: String,
    pub lanes: i64,
    pub capacity: i64,
    pub state: HeatState,
}

impl HeatOccupancy {
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.lanes >= self.capacity
    }

    #[must_use]
    pub const fn remaining(&self) -> i64 {
        let left = self.capacity - self.lanes;
        if left < 0 { 0 } else { left }
    }
}

/// Response from `heat heat show`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HeatDetail {
    pub heat: Heat,
    pub index: usize,
    pub state: HeatState,
    pub ticket_type_ids: Vec<String>,
    pub lanes: Vec<Lane>,
}
