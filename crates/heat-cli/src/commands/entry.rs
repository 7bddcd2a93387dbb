use heat_core::enums::EntryKind;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EntryCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `heat entry`.
pub async fn handle(action: &EntryCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        EntryCommands::Create {
            competition,
            name,
            ticket_type,
            kind,
        } => {
            let kind = parse_enum::<EntryKind>(kind, "kind")?;
            let entry = ctx
                .service
                .create_entry(competition, ticket_type.as_deref(), kind, name)
                .await?;
            output(&entry, flags.format)
        }
        EntryCommands::List {
            competition,
            ticket_type,
            unassigned,
            limit,
        } => {
            let limit = effective_limit(*limit, flags.limit, ctx.config.general.default_limit);
            let mut entries = if *unassigned {
                let mut entries = ctx.service.unassigned_entries(competition).await?;
                if let Some(ticket_type) = ticket_type {
                    entries.retain(|e| e.ticket_type_id.as_deref() == Some(ticket_type.as_str()));
                }
                entries
            } else {
                ctx.service
                    .entries_for_competition(competition, ticket_type.as_deref())
                    .await?
            };
            entries.truncate(limit);
            output(&entries, flags.format)
        }
    }
}
