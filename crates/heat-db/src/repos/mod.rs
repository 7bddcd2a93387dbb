//! Repository modules implementing the scheduling engine.
//!
//! Each module adds methods to `HeatService` via `impl HeatService` blocks and
//! exposes connection-level primitives (`pub(crate)`) that other modules call
//! inside an already-open transaction.

pub mod competition;
pub mod entry;
pub mod heat;
pub mod index;
pub mod lane;
pub mod sync;
pub mod workout;
