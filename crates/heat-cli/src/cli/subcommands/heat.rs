use clap::Subcommand;

/// Heat commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HeatCommands {
    /// Create heats in a workout, one per start time.
    Create {
        #[arg(long)]
        competition: String,
        #[arg(long)]
        workout: String,
        /// RFC 3339 start time; repeat for several heats.
        #[arg(long = "start", required = true)]
        starts: Vec<String>,
    },
    /// Update start time, eligible ticket types or round capacity.
    Update {
        id: String,
        #[arg(long)]
        start: Option<String>,
        /// Replaces the eligibility set; repeat for several.
        #[arg(long = "ticket-type")]
        ticket_types: Vec<String>,
        #[arg(long)]
        max_per_heat: Option<i64>,
    },
    /// Set round capacities in batch, as `HEAT_ID=MAX` pairs.
    Capacity {
        #[arg(required = true)]
        changes: Vec<String>,
    },
    /// Delete a heat and its linked heats.
    Delete { id: String },
    /// List heats of a workout in index order.
    List {
        workout: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a heat with its index, eligibility and lanes.
    Show { id: String },
}
