use heat_core::requests::NewHeat;
use heat_db::updates::heat::HeatUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HeatCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_capacity_change, parse_start_time};
use crate::context::AppContext;
use crate::output::output;

/// Handle `heat heat`.
pub async fn handle(action: &HeatCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        HeatCommands::Create {
            competition,
            workout,
            starts,
        } => {
            let requested = starts
                .iter()
                .map(|raw| {
                    Ok(NewHeat {
                        workout_id: workout.clone(),
                        start_time: parse_start_time(raw)?,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let heats = ctx.service.create_heats(competition, &requested).await?;
            output(&heats, flags.format)
        }
        HeatCommands::Update {
            id,
            start,
            ticket_types,
            max_per_heat,
        } => {
            if start.is_none() && ticket_types.is_empty() && max_per_heat.is_none() {
                anyhow::bail!("At least one of --start, --ticket-type, or --max-per-heat must be provided");
            }
            let mut builder = HeatUpdateBuilder::new();
            if let Some(start) = start.as_deref() {
                builder = builder.start_time(parse_start_time(start)?);
            }
            if !ticket_types.is_empty() {
                builder = builder.ticket_type_ids(ticket_types.iter().cloned());
            }
            if let Some(limit) = max_per_heat {
                builder = builder.max_limit_per_heat(*limit);
            }
            let heat = ctx.service.update_heat(id, builder.build()).await?;
            output(&heat, flags.format)
        }
        HeatCommands::Capacity { changes } => {
            let changes = changes
                .iter()
                .map(String::as_str)
                .map(parse_capacity_change)
                .collect::<anyhow::Result<Vec<_>>>()?;
            let outcomes = ctx.service.update_heat_capacities(&changes).await?;
            output(&outcomes, flags.format)
        }
        HeatCommands::Delete { id } => {
            let heat = ctx.service.delete_heat(id).await?;
            output(&heat, flags.format)
        }
        HeatCommands::List { workout, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.config.general.default_limit);
            let mut heats = ctx.service.heats_for_workout(workout).await?;
            heats.truncate(limit);
            output(&heats, flags.format)
        }
        HeatCommands::Show { id } => {
            let detail = ctx.service.heat_detail(id).await?;
            output(&detail, flags.format)
        }
    }
}
