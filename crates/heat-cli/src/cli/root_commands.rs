use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CompetitionCommands, EntryCommands, HeatCommands, LaneCommands, TicketTypeCommands,
    WorkoutCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the project config and database.
    Init(InitArgs),
    /// Competitions.
    Competition {
        #[command(subcommand)]
        action: CompetitionCommands,
    },
    /// Ticket types.
    TicketType {
        #[command(subcommand)]
        action: TicketTypeCommands,
    },
    /// Workouts.
    Workout {
        #[command(subcommand)]
        action: WorkoutCommands,
    },
    /// Entries (athletes and teams).
    Entry {
        #[command(subcommand)]
        action: EntryCommands,
    },
    /// Heats and round capacity.
    Heat {
        #[command(subcommand)]
        action: HeatCommands,
    },
    /// Lane placement, moves and ordering.
    Lane {
        #[command(subcommand)]
        action: LaneCommands,
    },
    /// Print the JSON schema of a response type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing `.heat/config.toml`.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type name, e.g. `heat`, `lane`, `capacity-outcome`.
    pub type_name: String,
}
