pub mod competition;
pub mod dispatch;
pub mod entry;
pub mod heat;
pub mod init;
pub mod lane;
pub mod schema;
pub mod shared;
pub mod ticket_type;
pub mod workout;
