use crate::cli::GlobalFlags;
use crate::cli::subcommands::WorkoutCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `heat workout`.
pub async fn handle(action: &WorkoutCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        WorkoutCommands::Create { competition, name } => {
            let workout = ctx.service.create_workout(competition, name).await?;
            output(&workout, flags.format)
        }
        WorkoutCommands::Delete { id } => {
            let workout = ctx.service.delete_workout(id).await?;
            output(&workout, flags.format)
        }
        WorkoutCommands::List { competition } => {
            let workouts = ctx.service.workouts_for_competition(competition).await?;
            output(&workouts, flags.format)
        }
    }
}
