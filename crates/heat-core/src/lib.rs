//! # heat-core
//!
//! Core types, ID prefixes, and error types for the heat/lane scheduler.
//!
//! This crate provides the foundational types shared across all crates:
//! - Entity structs for competitions, workouts, heats, lanes, entries and ticket types
//! - Enums for entry kinds, derived heat state, and entity kinds
//! - ID prefix constants
//! - Request and batch-result types exchanged with callers
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod requests;
pub mod responses;
