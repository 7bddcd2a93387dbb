//! ID prefix constants.
//!
//! Every row id is `{prefix}-{8 hex chars}`, e.g. `hea-a3f8b2c1`. The random
//! part is generated by the database (`randomblob(4)`).

pub const PREFIX_COMPETITION: &str = "cmp";
pub const PREFIX_WORKOUT: &str = "wod";
pub const PREFIX_HEAT: &str = "hea";
pub const PREFIX_LANE: &str = "lan";
pub const PREFIX_ENTRY: &str = "ent";
pub const PREFIX_TICKET_TYPE: &str = "tkt";

/// All known prefixes.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_COMPETITION,
    PREFIX_WORKOUT,
    PREFIX_HEAT,
    PREFIX_LANE,
    PREFIX_ENTRY,
    PREFIX_TICKET_TYPE,
];

/// Return the prefix portion of an id (`"hea-a3f8b2c1"` → `Some("hea")`).
#[must_use]
pub fn prefix_of(id: &str) -> Option<&str> {
    let (prefix, rest) = id.split_once('-')?;
    if rest.is_empty() || !ALL_PREFIXES.contains(&prefix) {
        return None;
    }
    Some(prefix)
}
