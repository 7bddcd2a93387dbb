use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LaneCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct UnassignAllResponse {
    competition_id: String,
    cleared: bool,
}

/// Handle `heat lane`.
pub async fn handle(action: &LaneCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LaneCommands::Assign { entry, heat } => {
            let lane = ctx.service.assign_entry_to_heat(entry, heat).await?;
            output(&lane, flags.format)
        }
        LaneCommands::Move { lane, heat } => {
            let lane = ctx.service.move_lane_to_heat(lane, heat).await?;
            output(&lane, flags.format)
        }
        LaneCommands::Reorder { lane, position } => {
            let lane = ctx.service.reorder_lane(lane, *position).await?;
            output(&lane, flags.format)
        }
        LaneCommands::Unassign { lane } => {
            let lane = ctx.service.unassign_entry(lane).await?;
            output(&lane, flags.format)
        }
        LaneCommands::UnassignAll { competition } => {
            let cleared = ctx.service.unassign_all_entries(competition).await?;
            output(
                &UnassignAllResponse {
                    competition_id: competition.clone(),
                    cleared,
                },
                flags.format,
            )
        }
    }
}
