//! Entry kinds, derived heat state, and entity kinds.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for the value stored in SQL.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids;

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Whether an entry is a single athlete or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Individual,
    Team,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Team => "team",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HeatState
// ---------------------------------------------------------------------------

/// Occupancy of a heat, derived from its lane rows. Never stored.
///
/// ```text
/// empty ⇄ occupied
/// ```
///
/// Only an `Empty` heat (and an empty linked set) can be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeatState {
    Empty,
    Occupied,
}

impl HeatState {
    #[must_use]
    pub const fn from_lane_count(lanes: u64) -> Self {
        if lanes == 0 { Self::Empty } else { Self::Occupied }
    }

    #[must_use]
    pub const fn is_deletable(self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Occupied => "occupied",
        }
    }
}

impl fmt::Display for HeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of row in the scheduling schema, used for ids and not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Competition,
    Workout,
    Heat,
    Lane,
    Entry,
    TicketType,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Competition => "competition",
            Self::Workout => "workout",
            Self::Heat => "heat",
            Self::Lane => "lane",
            Self::Entry => "entry",
            Self::TicketType => "ticket_type",
        }
    }

    /// Id prefix for rows of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Competition => ids::PREFIX_COMPETITION,
            Self::Workout => ids::PREFIX_WORKOUT,
            Self::Heat => ids::PREFIX_HEAT,
            Self::Lane => ids::PREFIX_LANE,
            Self::Entry => ids::PREFIX_ENTRY,
            Self::TicketType => ids::PREFIX_TICKET_TYPE,
        }
    }

    /// SQL table holding rows of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Competition => "competitions",
            Self::Workout => "workouts",
            Self::Heat => "heats",
            Self::Lane => "lanes",
            Self::Entry => "entries",
            Self::TicketType => "ticket_types",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
