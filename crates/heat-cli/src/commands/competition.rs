use heat_core::entities::{Competition, ScoreSettings, TicketType, Workout};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CompetitionCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct CompetitionOverview {
    competition: Competition,
    score_settings: Option<ScoreSettings>,
    ticket_types: Vec<TicketType>,
    workouts: Vec<Workout>,
}

/// Handle `heat competition`.
pub async fn handle(action: &CompetitionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        CompetitionCommands::Create { name, max_per_heat } => {
            let competition = ctx.service.create_competition(name, *max_per_heat).await?;
            output(&competition, flags.format)
        }
        CompetitionCommands::Show { id } => {
            let overview = CompetitionOverview {
                competition: ctx.service.get_competition(id).await?,
                score_settings: ctx.service.score_settings(id).await?,
                ticket_types: ctx.service.ticket_types_for_competition(id).await?,
                workouts: ctx.service.workouts_for_competition(id).await?,
            };
            output(&overview, flags.format)
        }
    }
}
