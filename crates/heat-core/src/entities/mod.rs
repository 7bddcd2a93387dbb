//! Entity structs for the scheduling schema.
//!
//! Each entity maps to a table created by `heat-db`'s migrations. All structs
//! derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and
//! schema generation.

mod competition;
mod entry;
mod heat;
mod lane;
mod ticket_type;
mod workout;

pub use competition::{Competition, ScoreSettings};
pub use entry::Entry;
pub use heat::Heat;
pub use lane::Lane;
pub use ticket_type::TicketType;
pub use workout::Workout;
