use clap::Subcommand;

/// Competition commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CompetitionCommands {
    /// Create a competition with its score settings.
    Create {
        name: String,
        /// Default capacity copied into new heats.
        #[arg(long)]
        max_per_heat: Option<i64>,
    },
    /// Show a competition with its settings, ticket types and workouts.
    Show { id: String },
}
