pub mod competition;
pub mod entry;
pub mod heat;
pub mod lane;
pub mod ticket_type;
pub mod workout;

pub use competition::CompetitionCommands;
pub use entry::EntryCommands;
pub use heat::HeatCommands;
pub use lane::LaneCommands;
pub use ticket_type::TicketTypeCommands;
pub use workout::WorkoutCommands;
