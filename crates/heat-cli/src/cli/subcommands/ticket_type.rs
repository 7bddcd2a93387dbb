use clap::Subcommand;

/// Ticket type commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TicketTypeCommands {
    /// Create a ticket type.
    Create {
        #[arg(long)]
        competition: String,
        name: String,
        #[arg(long, default_value_t = 1)]
        team_size: i64,
        /// Volunteers are never made eligible for heats.
        #[arg(long)]
        volunteer: bool,
    },
    /// List ticket types of a competition.
    List { competition: String },
}
