use clap::Subcommand;

/// Lane commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LaneCommands {
    /// Place an entry in a heat and its linked heats.
    Assign { entry: String, heat: String },
    /// Move a lane to another heat of its workout, projected across workouts.
    Move { lane: String, heat: String },
    /// Move a lane to a new position within its heat.
    Reorder { lane: String, position: i64 },
    /// Remove the lane's entry from every heat.
    Unassign { lane: String },
    /// Remove every lane in a competition.
    UnassignAll { competition: String },
}
