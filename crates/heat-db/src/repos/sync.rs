//! Cross-workout synchronizer.
//!
//! Projects an entry's placement or move in one workout onto the linked heats
//! of every other workout in the competition. Every projection runs inside
//! the caller's transaction, so a failure in any workout rolls back all of
//! them.

use heat_core::entities::{Entry, Heat, Lane};

use crate::HeatDb;
use crate::error::DatabaseError;
use crate::repos::competition::fetch_ticket_type;
use crate::repos::entry::{fetch_entry, lane_for_entry_in_heat, lane_for_entry_in_workout};
use crate::repos::heat::fetch_heat;
use crate::repos::index::{competition_of_workout, heats_at_index, linked_heats, rank_of};
use crate::repos::lane::{append_lane, count_lanes, fetch_lane, remove_lane};
use crate::repos::workout::fetch_workouts_for_competition;
use crate::service::HeatService;

/// Add the ticket type to the heat's eligibility set if missing.
///
/// Returns whether a row was inserted.
pub(crate) async fn ensure_ticket_eligibility(
    conn: &libsql::Connection,
    heat_id: &str,
    ticket_type_id: &str,
) -> Result<bool, DatabaseError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO heat_ticket_types (heat_id, ticket_type_id) VALUES (?1, ?2)",
            libsql::params![heat_id, ticket_type_id],
        )
        .await?;
    if inserted > 0 {
        tracing::debug!(heat = %heat_id, ticket_type = %ticket_type_id, "added ticket eligibility");
    }
    Ok(inserted > 0)
}

/// Fail with `Conflict` if the heat has no free lane.
pub(crate) async fn ensure_capacity(conn: &libsql::Connection, heat: &Heat) -> Result<(), DatabaseError> {
    let lanes = count_lanes(conn, &heat.id).await?;
    if lanes >= heat.max_limit_per_heat {
        return Err(DatabaseError::Conflict(format!(
            "heat {} is full ({lanes} of {} lanes)",
            heat.id, heat.max_limit_per_heat
        )));
    }
    Ok(())
}

/// Ticket type an entry competes under, checked to exist.
///
/// A missing ticket type on the entry is reported with `missing`.
async fn entry_ticket_type(
    conn: &libsql::Connection,
    entry: &Entry,
    missing: fn(String) -> DatabaseError,
) -> Result<String, DatabaseError> {
    let ticket_type_id = entry
        .ticket_type_id
        .clone()
        .ok_or_else(|| missing(format!("entry {} has no ticket type", entry.id)))?;
    if fetch_ticket_type(conn, &ticket_type_id).await?.is_none() {
        return Err(DatabaseError::Conflict(format!(
            "ticket type {ticket_type_id} of entry {} does not exist",
            entry.id
        )));
    }
    Ok(ticket_type_id)
}

/// Move the entry from `source`'s round to `target`'s round in every workout
/// that has heats at both indices. Returns the new lane in `target`.
pub(crate) async fn move_entry_between_rounds(
    conn: &libsql::Connection,
    entry: &Entry,
    ticket_type_id: &str,
    source: &Heat,
    target: &Heat,
    enforce_capacity: bool,
) -> Result<Lane, DatabaseError> {
    let competition_id = competition_of_workout(conn, &source.workout_id).await?;
    let source_index = rank_of(conn, source).await?;
    let target_index = rank_of(conn, target).await?;
    let sources = heats_at_index(conn, &competition_id, source_index).await?;
    let targets = heats_at_index(conn, &competition_id, target_index).await?;
    tracing::debug!(
        entry = %entry.id,
        source_index,
        target_index,
        "projecting move across workouts"
    );

    let mut moved = None;
    for workout in fetch_workouts_for_competition(conn, &competition_id).await? {
        let from = sources.iter().find(|h| h.workout_id == workout.id);
        let to = targets.iter().find(|h| h.workout_id == workout.id);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::warn!(workout = %workout.id, "no linked heat for move, skipping workout");
            continue;
        };
        let Some(lane) = lane_for_entry_in_heat(conn, &entry.id, &from.id).await? else {
            tracing::debug!(workout = %workout.id, "entry not in source heat, skipping workout");
            continue;
        };

        if let Some(existing) = lane_for_entry_in_heat(conn, &entry.id, &to.id).await? {
            remove_lane(conn, &lane.id).await?;
            if to.id == target.id {
                moved = Some(fetch_lane(conn, &existing.id).await?);
            }
            continue;
        }

        if enforce_capacity {
            ensure_capacity(conn, to).await?;
        }
        remove_lane(conn, &lane.id).await?;
        let appended = append_lane(conn, &to.id, &entry.id).await?;
        ensure_ticket_eligibility(conn, &to.id, ticket_type_id).await?;
        if to.id == target.id {
            moved = Some(appended);
        }
    }

    tracing::info!(entry = %entry.id, from = %source.id, to = %target.id, "moved entry");
    moved.ok_or(DatabaseError::NoResult)
}

async fn move_lane(
    conn: &libsql::Connection,
    lane_id: &str,
    heat_id: &str,
    enforce_capacity: bool,
) -> Result<Lane, DatabaseError> {
    let lane = fetch_lane(conn, lane_id).await?;
    let source = fetch_heat(conn, &lane.heat_id).await?;
    let target = fetch_heat(conn, heat_id).await?;
    if source.workout_id != target.workout_id {
        return Err(DatabaseError::InvalidState(format!(
            "heat {heat_id} is not in the workout of lane {lane_id}"
        )));
    }
    if source.id == target.id {
        return Ok(lane);
    }

    let entry = fetch_entry(conn, &lane.entry_id).await?;
    let ticket_type_id = entry_ticket_type(conn, &entry, DatabaseError::InvalidState).await?;
    move_entry_between_rounds(conn, &entry, &ticket_type_id, &source, &target, enforce_capacity).await
}

async fn move_entry(
    conn: &libsql::Connection,
    entry_id: &str,
    from_heat_id: &str,
    to_heat_id: &str,
    enforce_capacity: bool,
) -> Result<Lane, DatabaseError> {
    let lane = lane_for_entry_in_heat(conn, entry_id, from_heat_id)
        .await?
        .ok_or_else(|| {
            DatabaseError::InvalidState(format!("entry {entry_id} has no lane in heat {from_heat_id}"))
        })?;
    move_lane(conn, &lane.id, to_heat_id, enforce_capacity).await
}

async fn assign_entry(
    conn: &libsql::Connection,
    entry_id: &str,
    heat_id: &str,
    enforce_capacity: bool,
) -> Result<Lane, DatabaseError> {
    let entry = fetch_entry(conn, entry_id).await?;
    let heat = fetch_heat(conn, heat_id).await?;
    let linked = linked_heats(conn, heat_id).await?;
    if linked.competition_id != entry.competition_id {
        return Err(DatabaseError::InvalidState(format!(
            "entry {entry_id} and heat {heat_id} belong to different competitions"
        )));
    }
    let ticket_type_id = entry_ticket_type(conn, &entry, DatabaseError::Conflict).await?;
    if let Some(lane) = lane_for_entry_in_workout(conn, entry_id, &heat.workout_id).await? {
        return Err(DatabaseError::Conflict(format!(
            "entry {entry_id} is already scheduled in heat {} of this workout",
            lane.heat_id
        )));
    }

    let mut placed = None;
    for linked_heat in &linked.heats {
        if lane_for_entry_in_workout(conn, entry_id, &linked_heat.workout_id)
            .await?
            .is_some()
        {
            tracing::debug!(workout = %linked_heat.workout_id, "entry already scheduled, skipping workout");
            continue;
        }
        if enforce_capacity {
            ensure_capacity(conn, linked_heat).await?;
        }
        let lane = append_lane(conn, &linked_heat.id, entry_id).await?;
        ensure_ticket_eligibility(conn, &linked_heat.id, &ticket_type_id).await?;
        if linked_heat.id == heat.id {
            placed = Some(lane);
        }
    }

    tracing::info!(entry = %entry_id, heat = %heat_id, index = linked.index, "assigned entry");
    placed.ok_or(DatabaseError::NoResult)
}

impl HeatService {
    /// Place an entry in a heat for the first time.
    ///
    /// The entry is also placed in the linked heat of every other workout
    /// where it holds no lane yet.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` for a missing entry or heat
    /// - `DatabaseError::Conflict` if the entry has no usable ticket type, is
    ///   already scheduled in the heat's workout, or a heat is full while
    ///   capacity is enforced
    /// - `DatabaseError::InvalidState` if entry and heat belong to different
    ///   competitions
    pub async fn assign_entry_to_heat(&self, entry_id: &str, heat_id: &str) -> Result<Lane, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let tx = self.db().begin().await?;
        let result = assign_entry(&tx, entry_id, heat_id, enforce).await;
        HeatDb::finish(tx, result).await
    }

    /// Move a lane to another heat of the same workout, and its entry to the
    /// corresponding heat in every other workout.
    ///
    /// Workouts without heats at both indices, or where the entry is not in
    /// the source round, are skipped. Returns the lane in `heat_id`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` for a missing lane or heat
    /// - `DatabaseError::InvalidState` if the target heat is in another
    ///   workout or the lane's entry has no ticket type
    /// - `DatabaseError::Conflict` if the entry's ticket type is missing or a
    ///   target heat is full while capacity is enforced
    pub async fn move_lane_to_heat(&self, lane_id: &str, heat_id: &str) -> Result<Lane, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let tx = self.db().begin().await?;
        let result = move_lane(&tx, lane_id, heat_id, enforce).await;
        HeatDb::finish(tx, result).await
    }

    /// Entry-addressed form of [`Self::move_lane_to_heat`].
    ///
    /// # Errors
    ///
    /// As `move_lane_to_heat`, plus `DatabaseError::InvalidState` if the entry
    /// has no lane in `from_heat_id`.
    pub async fn move_entry_to_heat(
        &self,
        entry_id: &str,
        from_heat_id: &str,
        to_heat_id: &str,
    ) -> Result<Lane, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let tx = self.db().begin().await?;
        let result = move_entry(&tx, entry_id, from_heat_id, to_heat_id, enforce).await;
        HeatDb::finish(tx, result).await
    }
}
