//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields are applied; an update with every field `None` changes nothing.

pub mod heat;
