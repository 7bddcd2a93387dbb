use crate::cli::GlobalFlags;
use crate::cli::subcommands::TicketTypeCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `heat ticket-type`.
pub async fn handle(action: &TicketTypeCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        TicketTypeCommands::Create {
            competition,
            name,
            team_size,
            volunteer,
        } => {
            let ticket_type = ctx
                .service
                .create_ticket_type(competition, name, *team_size, *volunteer)
                .await?;
            output(&ticket_type, flags.format)
        }
        TicketTypeCommands::List { competition } => {
            let ticket_types = ctx.service.ticket_types_for_competition(competition).await?;
            output(&ticket_types, flags.format)
        }
    }
}
