use clap::Subcommand;

/// Workout commands.
#[derive(Clone, Debug, Subcommand)]
pub enum WorkoutCommands {
    /// Create a workout.
    Create {
        #[arg(long)]
        competition: String,
        name: String,
    },
    /// Delete a workout with all its heats and lanes.
    Delete { id: String },
    /// List workouts of a competition.
    List { competition: String },
}
