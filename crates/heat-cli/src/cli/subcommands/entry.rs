use clap::Subcommand;

/// Entry commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EntryCommands {
    /// Register an entry.
    Create {
        #[arg(long)]
        competition: String,
        name: String,
        #[arg(long)]
        ticket_type: Option<String>,
        /// individual or team
        #[arg(long, default_value = "individual")]
        kind: String,
    },
    /// List entries of a competition.
    List {
        competition: String,
        #[arg(long)]
        ticket_type: Option<String>,
        /// Only entries without any lane.
        #[arg(long)]
        unassigned: bool,
        #[arg(long)]
        limit: Option<u32>,
    },
}
