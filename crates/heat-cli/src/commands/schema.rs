use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Names accepted by `heat schema`.
pub const SCHEMA_NAMES: &[&str] = &[
    "competition",
    "score-settings",
    "ticket-type",
    "workout",
    "heat",
    "lane",
    "entry",
    "new-heat",
    "capacity-change",
    "capacity-outcome",
    "heat-occupancy",
    "heat-detail",
];

macro_rules! schema_value {
    ($ty:ty) => {
        serde_json::to_value(schema_for!($ty))?
    };
}

/// JSON schema of a named entity, request, or response type.
pub fn schema_for_name(name: &str) -> anyhow::Result<serde_json::Value> {
    use heat_core::entities::{Competition, Entry, Heat, Lane, ScoreSettings, TicketType, Workout};
    use heat_core::requests::{CapacityChange, NewHeat};
    use heat_core::responses::{CapacityOutcome, HeatDetail, HeatOccupancy};

    let value = match name.replace('_', "-").as_str() {
        "competition" => schema_value!(Competition),
        "score-settings" => schema_value!(ScoreSettings),
        "ticket-type" => schema_value!(TicketType),
        "workout" => schema_value!(Workout),
        "heat" => schema_value!(Heat),
        "lane" => schema_value!(Lane),
        "entry" => schema_value!(Entry),
        "new-heat" => schema_value!(NewHeat),
        "capacity-change" => schema_value!(CapacityChange),
        "capacity-outcome" => schema_value!(CapacityOutcome),
        "heat-occupancy" => schema_value!(HeatOccupancy),
        "heat-detail" => schema_value!(HeatDetail),
        other => anyhow::bail!(
            "unknown schema type '{other}'; expected one of: {}",
            SCHEMA_NAMES.join(", ")
        ),
    };
    Ok(value)
}

/// Handle `heat schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_for_name(&args.type_name)?, flags.format)
}
