use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Competition { action } => commands::competition::handle(&action, ctx, flags).await,
        Commands::TicketType { action } => commands::ticket_type::handle(&action, ctx, flags).await,
        Commands::Workout { action } => commands::workout::handle(&action, ctx, flags).await,
        Commands::Entry { action } => commands::entry::handle(&action, ctx, flags).await,
        Commands::Heat { action } => commands::heat::handle(&action, ctx, flags).await,
        Commands::Lane { action } => commands::lane::handle(&action, ctx, flags).await,
        Commands::Init(_) | Commands::Schema(_) => {
            anyhow::bail!("init and schema are handled before the database is opened")
        }
    }
}
