//! Heat lifecycle: creation, round capacity, paired deletion, and reads.
//!
//! Capacity belongs to a round, not a heat: every change is written to all
//! heats linked to the one addressed. Deletion likewise removes the whole
//! round, and only when none of its heats holds a lane.

use heat_core::entities::Heat;
use heat_core::enums::{EntityKind, HeatState};
use heat_core::ids::PREFIX_HEAT;
use heat_core::requests::{CapacityChange, NewHeat, validate_capacity};
use heat_core::responses::{CapacityOutcome, HeatDetail, HeatOccupancy};

use crate::HeatDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, generate_id, normalize_datetime, now, parse_datetime, query_all, query_count,
    query_opt,
};
use crate::repos::competition::{
    fetch_competing_ticket_types, fetch_competition, fetch_score_settings, fetch_ticket_type,
};
use crate::repos::index::{competition_of_workout, linked_heats, rank_of};
use crate::repos::lane::{count_lanes, fetch_lanes_for_heat};
use crate::repos::sync::ensure_ticket_eligibility;
use crate::repos::workout::fetch_workout;
use crate::service::HeatService;
use crate::updates::heat::HeatUpdate;

pub(crate) const HEAT_COLS: &str =
    "id, workout_id, start_time, sequence, max_limit_per_heat, created_at";

pub(crate) fn row_to_heat(row: &libsql::Row) -> Result<Heat, DatabaseError> {
    Ok(Heat {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        start_time: parse_datetime(&row.get::<String>(2)?)?,
        sequence: row.get(3)?,
        max_limit_per_heat: row.get(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn fetch_heat(conn: &libsql::Connection, id: &str) -> Result<Heat, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {HEAT_COLS} FROM heats WHERE id = ?1"),
        [id],
        row_to_heat,
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Heat, id))
}

pub(crate) async fn fetch_heats_for_workout(
    conn: &libsql::Connection,
    workout_id: &str,
) -> Result<Vec<Heat>, DatabaseError> {
    query_all(
        conn,
        &format!(
            "SELECT {HEAT_COLS} FROM heats WHERE workout_id = ?1 ORDER BY start_time, sequence, id"
        ),
        [workout_id],
        row_to_heat,
    )
    .await
}

pub(crate) async fn fetch_heat_ticket_type_ids(
    conn: &libsql::Connection,
    heat_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    query_all(
        conn,
        "SELECT ticket_type_id FROM heat_ticket_types WHERE heat_id = ?1 ORDER BY ticket_type_id",
        [heat_id],
        |row| Ok(row.get::<String>(0)?),
    )
    .await
}

fn state_for(lanes: i64) -> HeatState {
    HeatState::from_lane_count(u64::try_from(lanes).unwrap_or_default())
}

async fn insert_heats(
    conn: &libsql::Connection,
    competition_id: &str,
    requested: &[NewHeat],
    fallback_capacity: i64,
) -> Result<Vec<Heat>, DatabaseError> {
    fetch_competition(conn, competition_id).await?;
    let capacity = fetch_score_settings(conn, competition_id)
        .await?
        .map_or(fallback_capacity, |s| s.default_max_per_heat);
    let ticket_types = fetch_competing_ticket_types(conn, competition_id).await?;

    let mut created = Vec::with_capacity(requested.len());
    for new in requested {
        let workout = fetch_workout(conn, &new.workout_id).await?;
        if workout.competition_id != competition_id {
            return Err(DatabaseError::InvalidState(format!(
                "workout {} does not belong to competition {competition_id}",
                workout.id
            )));
        }

        let sequence = query_count(
            conn,
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM heats WHERE workout_id = ?1",
            [workout.id.as_str()],
        )
        .await?;
        let now = now();
        let start_time = normalize_datetime(new.start_time);
        let id = generate_id(conn, PREFIX_HEAT).await?;
        conn.execute(
            &format!("INSERT INTO heats ({HEAT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            libsql::params![
                id.as_str(),
                workout.id.as_str(),
                format_datetime(&start_time),
                sequence,
                capacity,
                format_datetime(&now)
            ],
        )
        .await?;
        for ticket_type in &ticket_types {
            ensure_ticket_eligibility(conn, &id, &ticket_type.id).await?;
        }

        created.push(Heat {
            id,
            workout_id: workout.id,
            start_time,
            sequence,
            max_limit_per_heat: capacity,
            created_at: now,
        });
    }

    tracing::info!(competition = %competition_id, heats = created.len(), capacity, "created heats");
    Ok(created)
}

/// Write `limit` to every heat linked to `heat_id`. Returns the updated heats.
async fn apply_capacity(
    conn: &libsql::Connection,
    heat_id: &str,
    limit: i64,
    enforce_capacity: bool,
) -> Result<Vec<Heat>, DatabaseError> {
    validate_capacity(limit)?;
    let linked = linked_heats(conn, heat_id).await?;

    let mut updated = Vec::with_capacity(linked.heats.len());
    for heat in linked.heats {
        if enforce_capacity {
            let lanes = count_lanes(conn, &heat.id).await?;
            if lanes > limit {
                return Err(DatabaseError::Conflict(format!(
                    "heat {} already holds {lanes} lanes, more than the new limit {limit}",
                    heat.id
                )));
            }
        }
        conn.execute(
            "UPDATE heats SET max_limit_per_heat = ?1 WHERE id = ?2",
            libsql::params![limit, heat.id.as_str()],
        )
        .await?;
        updated.push(Heat {
            max_limit_per_heat: limit,
            ..heat
        });
    }

    tracing::info!(heat = %heat_id, index = linked.index, limit, heats = updated.len(), "updated round capacity");
    Ok(updated)
}

async fn replace_ticket_types(
    conn: &libsql::Connection,
    heat: &Heat,
    ticket_type_ids: &[String],
) -> Result<(), DatabaseError> {
    let competition_id = competition_of_workout(conn, &heat.workout_id).await?;
    for ticket_type_id in ticket_type_ids {
        let ticket = fetch_ticket_type(conn, ticket_type_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityKind::TicketType, ticket_type_id))?;
        if ticket.competition_id != competition_id {
            return Err(DatabaseError::InvalidState(format!(
                "ticket type {ticket_type_id} belongs to another competition"
            )));
        }
    }

    conn.execute("DELETE FROM heat_ticket_types WHERE heat_id = ?1", [heat.id.as_str()])
        .await?;
    for ticket_type_id in ticket_type_ids {
        ensure_ticket_eligibility(conn, &heat.id, ticket_type_id).await?;
    }
    Ok(())
}

/// Reapply per-index round limits after a start time change reordered a
/// workout, so every heat takes the capacity of the round it now sits in.
async fn realign_round_limits(
    conn: &libsql::Connection,
    workout_id: &str,
    round_limits: &[i64],
    enforce_capacity: bool,
) -> Result<(), DatabaseError> {
    let heats = fetch_heats_for_workout(conn, workout_id).await?;
    for (heat, &limit) in heats.iter().zip(round_limits) {
        if heat.max_limit_per_heat == limit {
            continue;
        }
        if enforce_capacity {
            let lanes = count_lanes(conn, &heat.id).await?;
            if lanes > limit {
                return Err(DatabaseError::Conflict(format!(
                    "heat {} holds {lanes} lanes, more than its new round's limit {limit}",
                    heat.id
                )));
            }
        }
        conn.execute(
            "UPDATE heats SET max_limit_per_heat = ?1 WHERE id = ?2",
            libsql::params![limit, heat.id.as_str()],
        )
        .await?;
        tracing::debug!(heat = %heat.id, limit, "heat adopted round limit");
    }
    Ok(())
}

async fn apply_heat_update(
    conn: &libsql::Connection,
    heat_id: &str,
    update: &HeatUpdate,
    enforce_capacity: bool,
) -> Result<Heat, DatabaseError> {
    let heat = fetch_heat(conn, heat_id).await?;
    if update.is_empty() {
        return Ok(heat);
    }

    if let Some(start_time) = update.start_time {
        let round_limits: Vec<i64> = fetch_heats_for_workout(conn, &heat.workout_id)
            .await?
            .iter()
            .map(|h| h.max_limit_per_heat)
            .collect();
        conn.execute(
            "UPDATE heats SET start_time = ?1 WHERE id = ?2",
            libsql::params![format_datetime(&normalize_datetime(start_time)), heat_id],
        )
        .await?;
        realign_round_limits(conn, &heat.workout_id, &round_limits, enforce_capacity).await?;
    }
    if let Some(ref ticket_type_ids) = update.ticket_type_ids {
        replace_ticket_types(conn, &heat, ticket_type_ids).await?;
    }
    // Resolved after the start time change, so the limit follows the heat's new round.
    if let Some(limit) = update.max_limit_per_heat {
        apply_capacity(conn, heat_id, limit, enforce_capacity).await?;
    }

    tracing::info!(heat = %heat_id, "updated heat");
    fetch_heat(conn, heat_id).await
}

async fn delete_round(conn: &libsql::Connection, heat_id: &str) -> Result<Heat, DatabaseError> {
    let heat = fetch_heat(conn, heat_id).await?;
    let linked = linked_heats(conn, heat_id).await?;

    let mut occupied = Vec::new();
    for linked_heat in &linked.heats {
        let lanes = count_lanes(conn, &linked_heat.id).await?;
        if lanes > 0 {
            occupied.push(format!("{} ({lanes} lanes)", linked_heat.id));
        }
    }
    if !occupied.is_empty() {
        return Err(DatabaseError::Conflict(format!(
            "cannot delete heat {heat_id}: registered athletes are scheduled in linked heats {}",
            occupied.join(", ")
        )));
    }

    for linked_heat in &linked.heats {
        let id = linked_heat.id.as_str();
        conn.execute("DELETE FROM lanes WHERE heat_id = ?1", [id]).await?;
        conn.execute("DELETE FROM heat_ticket_types WHERE heat_id = ?1", [id])
            .await?;
        conn.execute("DELETE FROM heats WHERE id = ?1", [id]).await?;
    }

    tracing::info!(heat = %heat_id, index = linked.index, heats = linked.heats.len(), "deleted round");
    Ok(heat)
}

impl HeatService {
    /// Create heats in workouts of one competition.
    ///
    /// Capacity comes from the competition's score settings (or the scheduler
    /// default when the row is missing). Every non-volunteer ticket type of
    /// the competition is made eligible.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for a missing competition or workout,
    /// and `DatabaseError::InvalidState` for a workout of another competition.
    pub async fn create_heats(
        &self,
        competition_id: &str,
        heats: &[NewHeat],
    ) -> Result<Vec<Heat>, DatabaseError> {
        let fallback = self.scheduler().default_max_per_heat;
        let tx = self.db().begin().await?;
        let result = insert_heats(&tx, competition_id, heats, fallback).await;
        HeatDb::finish(tx, result).await
    }

    /// Change start time, eligibility, and round capacity of a heat.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for a missing heat or ticket type,
    /// `DatabaseError::Validation` for a capacity below one, and
    /// `DatabaseError::Conflict` when enforced capacity would drop below
    /// current occupancy.
    pub async fn update_heat(&self, heat_id: &str, update: HeatUpdate) -> Result<Heat, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let tx = self.db().begin().await?;
        let result = apply_heat_update(&tx, heat_id, &update, enforce).await;
        HeatDb::finish(tx, result).await
    }

    /// Set the capacity of the heat's whole round. Returns every updated heat.
    ///
    /// # Errors
    ///
    /// As the capacity part of [`Self::update_heat`].
    pub async fn update_capacity(&self, heat_id: &str, limit: i64) -> Result<Vec<Heat>, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let tx = self.db().begin().await?;
        let result = apply_capacity(&tx, heat_id, limit, enforce).await;
        HeatDb::finish(tx, result).await
    }

    /// Batch form of [`Self::update_capacity`].
    ///
    /// Each item runs in its own transaction; a failed item does not undo the
    /// others. Storage errors on `begin` abort the batch.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only if a transaction cannot be started.
    pub async fn update_heat_capacities(
        &self,
        changes: &[CapacityChange],
    ) -> Result<Vec<CapacityOutcome>, DatabaseError> {
        let enforce = self.scheduler().enforce_capacity;
        let mut outcomes = Vec::with_capacity(changes.len());
        for change in changes {
            let result = match change.validate() {
                Ok(()) => {
                    let tx = self.db().begin().await?;
                    let result = apply_capacity(&tx, &change.heat_id, change.max_entries, enforce).await;
                    HeatDb::finish(tx, result).await
                }
                Err(e) => Err(e.into()),
            };
            let (heats, error) = match result {
                Ok(heats) => (heats, None),
                Err(e) => {
                    tracing::warn!(heat = %change.heat_id, error = %e, "capacity change failed");
                    (Vec::new(), Some(e.to_string()))
                }
            };
            outcomes.push(CapacityOutcome {
                heat_id: change.heat_id.clone(),
                max_entries: change.max_entries,
                heats,
                error,
            });
        }
        Ok(outcomes)
    }

    /// Delete a heat together with its linked heats.
    ///
    /// Returns the heat as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` if any linked heat holds a lane, in
    /// which case nothing is deleted.
    pub async fn delete_heat(&self, heat_id: &str) -> Result<Heat, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = delete_round(&tx, heat_id).await;
        HeatDb::finish(tx, result).await
    }

    pub async fn get_heat(&self, id: &str) -> Result<Heat, DatabaseError> {
        fetch_heat(self.db().conn(), id).await
    }

    /// Heats of a workout in index order.
    pub async fn heats_for_workout(&self, workout_id: &str) -> Result<Vec<Heat>, DatabaseError> {
        fetch_heats_for_workout(self.db().conn(), workout_id).await
    }

    pub async fn heat_ticket_type_ids(&self, heat_id: &str) -> Result<Vec<String>, DatabaseError> {
        fetch_heat_ticket_type_ids(self.db().conn(), heat_id).await
    }

    /// Occupancy state derived from the heat's lanes.
    pub async fn heat_state(&self, heat_id: &str) -> Result<HeatState, DatabaseError> {
        let conn = self.db().conn();
        fetch_heat(conn, heat_id).await?;
        Ok(state_for(count_lanes(conn, heat_id).await?))
    }

    pub async fn heat_occupancy(&self, heat_id: &str) -> Result<HeatOccupancy, DatabaseError> {
        let conn = self.db().conn();
        let heat = fetch_heat(conn, heat_id).await?;
        let lanes = count_lanes(conn, heat_id).await?;
        Ok(HeatOccupancy {
            heat_id: heat.id,
            lanes,
            capacity: heat.max_limit_per_heat,
            state: state_for(lanes),
        })
    }

    /// Heat with its index, eligibility and lanes.
    pub async fn heat_detail(&self, heat_id: &str) -> Result<HeatDetail, DatabaseError> {
        let conn = self.db().conn();
        let heat = fetch_heat(conn, heat_id).await?;
        let index = rank_of(conn, &heat).await?;
        let lanes = fetch_lanes_for_heat(conn, heat_id).await?;
        let ticket_type_ids = fetch_heat_ticket_type_ids(conn, heat_id).await?;
        let state = state_for(i64::try_from(lanes.len()).unwrap_or(i64::MAX));
        Ok(HeatDetail {
            heat,
            index,
            state,
            ticket_type_ids,
            lanes,
        })
    }
}
