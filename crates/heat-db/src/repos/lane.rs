//! Lane allocator.
//!
//! Keeps lane numbers within a heat contiguous from 1. Storage enforces
//! `UNIQUE(heat_id, number)` row by row, so every renumbering is planned up
//! front as an ordered list of single-row writes that never collide:
//!
//! - [`renumber_plan`] closes gaps after a removal. Lanes are visited in
//!   ascending order of their old number and only ever move down.
//! - [`shift_plan`] moves one lane to a new position in three phases: park it
//!   at a sentinel number past the end, shift the lanes in between by one
//!   toward the freed slot, then drop it into the slot at the target.

use std::collections::BTreeSet;

use heat_core::entities::Lane;
use heat_core::enums::EntityKind;
use heat_core::ids::PREFIX_LANE;

use crate::HeatDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, generate_id, now, parse_datetime, query_all, query_count, query_opt};
use crate::repos::competition::fetch_competition;
use crate::service::HeatService;

pub(crate) const LANE_COLS: &str = "id, heat_id, entry_id, number, created_at";

/// One planned write: set lane `.0` to number `.1`.
pub type LaneStep = (String, i64);

pub(crate) fn row_to_lane(row: &libsql::Row) -> Result<Lane, DatabaseError> {
    Ok(Lane {
        id: row.get(0)?,
        heat_id: row.get(1)?,
        entry_id: row.get(2)?,
        number: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Writes that renumber `lanes` to `1..=k`, keeping their relative order.
///
/// Lanes already at their final number are left out.
#[must_use]
pub fn renumber_plan(lanes: &[LaneStep]) -> Vec<LaneStep> {
    let mut sorted: Vec<&LaneStep> = lanes.iter().collect();
    sorted.sort_by_key(|(_, number)| *number);

    sorted
        .into_iter()
        .zip(1_i64..)
        .filter(|((_, old), new)| old != new)
        .map(|((id, _), new)| (id.clone(), new))
        .collect()
}

/// Writes that move `lane_id` to `new_position` within contiguous `lanes`.
///
/// The first step parks the lane at `max + 1`; the last step sets its final
/// number. Moving to the current position plans nothing.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` if `new_position` is outside `1..=k`,
/// and `DatabaseError::InvalidState` if `lane_id` is not among `lanes`.
pub fn shift_plan(
    lanes: &[LaneStep],
    lane_id: &str,
    new_position: i64,
) -> Result<Vec<LaneStep>, DatabaseError> {
    let count = i64::try_from(lanes.len())
        .map_err(|_| DatabaseError::InvalidState("lane count exceeds integer range".into()))?;
    if new_position < 1 || new_position > count {
        return Err(DatabaseError::Validation(format!(
            "lane position must be between 1 and {count}, got {new_position}"
        )));
    }
    let old_position = lanes
        .iter()
        .find(|(id, _)| id == lane_id)
        .map(|(_, number)| *number)
        .ok_or_else(|| DatabaseError::InvalidState(format!("lane {lane_id} is not in this heat")))?;
    if old_position == new_position {
        return Ok(Vec::new());
    }

    let sentinel = lanes.iter().map(|(_, n)| *n).max().unwrap_or(0) + 1;
    let mut plan = vec![(lane_id.to_string(), sentinel)];

    let mut between: Vec<&LaneStep> = lanes
        .iter()
        .filter(|(id, n)| {
            id != lane_id
                && if new_position < old_position {
                    (new_position..old_position).contains(n)
                } else {
                    (old_position + 1..=new_position).contains(n)
                }
        })
        .collect();

    if new_position < old_position {
        // Moving up: open the slot from the bottom, highest number first.
        between.sort_by_key(|(_, n)| std::cmp::Reverse(*n));
        plan.extend(between.into_iter().map(|(id, n)| (id.clone(), n + 1)));
    } else {
        // Moving down: close the freed slot, lowest number first.
        between.sort_by_key(|(_, n)| *n);
        plan.extend(between.into_iter().map(|(id, n)| (id.clone(), n - 1)));
    }

    plan.push((lane_id.to_string(), new_position));
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Primitives (run inside the caller's transaction)
// ---------------------------------------------------------------------------

pub(crate) async fn fetch_lane(conn: &libsql::Connection, id: &str) -> Result<Lane, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {LANE_COLS} FROM lanes WHERE id = ?1"),
        [id],
        row_to_lane,
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Lane, id))
}

pub(crate) async fn fetch_lanes_for_heat(
    conn: &libsql::Connection,
    heat_id: &str,
) -> Result<Vec<Lane>, DatabaseError> {
    query_all(
        conn,
        &format!("SELECT {LANE_COLS} FROM lanes WHERE heat_id = ?1 ORDER BY number"),
        [heat_id],
        row_to_lane,
    )
    .await
}

pub(crate) async fn count_lanes(conn: &libsql::Connection, heat_id: &str) -> Result<i64, DatabaseError> {
    query_count(conn, "SELECT COUNT(*) FROM lanes WHERE heat_id = ?1", [heat_id]).await
}

async fn apply_plan(conn: &libsql::Connection, plan: &[LaneStep]) -> Result<(), DatabaseError> {
    for (id, number) in plan {
        conn.execute(
            "UPDATE lanes SET number = ?1 WHERE id = ?2",
            libsql::params![*number, id.as_str()],
        )
        .await?;
    }
    Ok(())
}

async fn lane_steps(conn: &libsql::Connection, heat_id: &str) -> Result<Vec<LaneStep>, DatabaseError> {
    query_all(
        conn,
        "SELECT id, number FROM lanes WHERE heat_id = ?1 ORDER BY number",
        [heat_id],
        |row| Ok((row.get::<String>(0)?, row.get::<i64>(1)?)),
    )
    .await
}

/// Insert a lane at `max(number) + 1`, or 1 in an empty heat.
pub(crate) async fn append_lane(
    conn: &libsql::Connection,
    heat_id: &str,
    entry_id: &str,
) -> Result<Lane, DatabaseError> {
    let number = query_count(
        conn,
        "SELECT COALESCE(MAX(number), 0) + 1 FROM lanes WHERE heat_id = ?1",
        [heat_id],
    )
    .await?;

    let now = now();
    let id = generate_id(conn, PREFIX_LANE).await?;
    conn.execute(
        &format!("INSERT INTO lanes ({LANE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
        libsql::params![id.as_str(), heat_id, entry_id, number, format_datetime(&now)],
    )
    .await?;

    tracing::debug!(heat = %heat_id, entry = %entry_id, number, "appended lane");
    Ok(Lane {
        id,
        heat_id: heat_id.to_string(),
        entry_id: entry_id.to_string(),
        number,
        created_at: now,
    })
}

/// Renumber the heat's lanes to `1..=k` in order of their current numbers.
///
/// Returns how many lanes changed number.
pub(crate) async fn renumber_heat(
    conn: &libsql::Connection,
    heat_id: &str,
) -> Result<usize, DatabaseError> {
    let plan = renumber_plan(&lane_steps(conn, heat_id).await?);
    apply_plan(conn, &plan).await?;
    Ok(plan.len())
}

/// Delete a lane and close the gap it leaves. Returns the deleted lane.
pub(crate) async fn remove_lane(
    conn: &libsql::Connection,
    lane_id: &str,
) -> Result<Lane, DatabaseError> {
    let lane = fetch_lane(conn, lane_id).await?;
    conn.execute("DELETE FROM lanes WHERE id = ?1", [lane_id])
        .await?;
    let shifted = renumber_heat(conn, &lane.heat_id).await?;
    tracing::debug!(lane = %lane_id, heat = %lane.heat_id, shifted, "removed lane");
    Ok(lane)
}

pub(crate) async fn move_lane_within_heat(
    conn: &libsql::Connection,
    lane_id: &str,
    new_position: i64,
) -> Result<Lane, DatabaseError> {
    let lane = fetch_lane(conn, lane_id).await?;
    let plan = shift_plan(&lane_steps(conn, &lane.heat_id).await?, lane_id, new_position)?;
    apply_plan(conn, &plan).await?;
    Ok(Lane {
        number: new_position,
        ..lane
    })
}

/// Delete every lane of the entry, in every heat, and renumber each heat
/// that lost one. Returns the deleted lanes.
pub(crate) async fn remove_all_lanes_for_entry(
    conn: &libsql::Connection,
    entry_id: &str,
) -> Result<Vec<Lane>, DatabaseError> {
    let lanes = query_all(
        conn,
        &format!("SELECT {LANE_COLS} FROM lanes WHERE entry_id = ?1"),
        [entry_id],
        row_to_lane,
    )
    .await?;

    conn.execute("DELETE FROM lanes WHERE entry_id = ?1", [entry_id])
        .await?;

    let heats: BTreeSet<&str> = lanes.iter().map(|l| l.heat_id.as_str()).collect();
    for heat_id in heats {
        renumber_heat(conn, heat_id).await?;
    }
    Ok(lanes)
}

async fn unassign_entry_of_lane(
    conn: &libsql::Connection,
    lane_id: &str,
) -> Result<Lane, DatabaseError> {
    let lane = fetch_lane(conn, lane_id).await?;
    let removed = remove_all_lanes_for_entry(conn, &lane.entry_id).await?;
    tracing::info!(entry = %lane.entry_id, lanes = removed.len(), "unassigned entry");
    Ok(lane)
}

async fn clear_competition_lanes(
    conn: &libsql::Connection,
    competition_id: &str,
) -> Result<u64, DatabaseError> {
    fetch_competition(conn, competition_id).await?;
    let removed = conn
        .execute(
            "DELETE FROM lanes WHERE heat_id IN (
                SELECT h.id FROM heats h JOIN workouts w ON w.id = h.workout_id
                WHERE w.competition_id = ?1
             )",
            [competition_id],
        )
        .await?;
    tracing::info!(competition = %competition_id, lanes = removed, "unassigned all entries");
    Ok(removed)
}

impl HeatService {
    pub async fn get_lane(&self, id: &str) -> Result<Lane, DatabaseError> {
        fetch_lane(self.db().conn(), id).await
    }

    /// Lanes of a heat ordered by number.
    pub async fn lanes_for_heat(&self, heat_id: &str) -> Result<Vec<Lane>, DatabaseError> {
        fetch_lanes_for_heat(self.db().conn(), heat_id).await
    }

    /// Move a lane to `new_position` within its heat.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for a missing lane and
    /// `DatabaseError::Validation` if the position is outside `1..=k`.
    pub async fn reorder_lane(&self, lane_id: &str, new_position: i64) -> Result<Lane, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = move_lane_within_heat(&tx, lane_id, new_position).await;
        HeatDb::finish(tx, result).await
    }

    /// Remove a single lane and renumber its heat. Other workouts are untouched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the lane does not exist.
    pub async fn remove_lane(&self, lane_id: &str) -> Result<Lane, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = remove_lane(&tx, lane_id).await;
        HeatDb::finish(tx, result).await
    }

    /// Remove the lane's entry from every heat it is scheduled in.
    ///
    /// Returns the lane as it was before removal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the lane does not exist.
    pub async fn unassign_entry(&self, lane_id: &str) -> Result<Lane, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = unassign_entry_of_lane(&tx, lane_id).await;
        HeatDb::finish(tx, result).await
    }

    /// Remove every lane in every heat of the competition.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the competition does not exist.
    pub async fn unassign_all_entries(&self, competition_id: &str) -> Result<bool, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = clear_competition_lanes(&tx, competition_id).await;
        HeatDb::finish(tx, result).await.map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::test_support::helpers::{assert_contiguous, seed_competition, seed_entries, test_service};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn steps(numbers: &[i64]) -> Vec<LaneStep> {
        numbers
            .iter()
            .enumerate()
            .map(|(i, n)| (format!("lan-{i:08}"), *n))
            .collect()
    }

    /// Apply a plan to an id -> number map, failing on any transient duplicate.
    fn apply_checked(state: &mut HashMap<String, i64>, plan: &[LaneStep]) -> Result<(), String> {
        for (id, number) in plan {
            if state.iter().any(|(other, n)| other != id && n == number) {
                return Err(format!("{id} -> {number} collides"));
            }
            state.insert(id.clone(), *number);
        }
        Ok(())
    }

    fn numbers_of(state: &HashMap<String, i64>) -> Vec<i64> {
        let mut numbers: Vec<i64> = state.values().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    #[test]
    fn renumber_plan_skips_lanes_already_in_place() {
        let plan = renumber_plan(&steps(&[1, 3, 4]));
        assert_eq!(
            plan,
            vec![("lan-00000001".to_string(), 2), ("lan-00000002".to_string(), 3)]
        );
    }

    #[rstest]
    #[case(4, 1)]
    #[case(1, 4)]
    #[case(2, 3)]
    #[case(3, 2)]
    fn shift_plan_parks_at_sentinel_first(#[case] from: i64, #[case] to: i64) {
        let lanes = steps(&[1, 2, 3, 4]);
        let id = format!("lan-{:08}", from - 1);
        let plan = shift_plan(&lanes, &id, to).unwrap();
        assert_eq!(plan.first(), Some(&(id.clone(), 5)));
        assert_eq!(plan.last(), Some(&(id, to)));
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(-1)]
    fn shift_plan_rejects_out_of_range(#[case] to: i64) {
        let result = shift_plan(&steps(&[1, 2, 3, 4]), "lan-00000000", to);
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[test]
    fn shift_plan_same_position_is_empty() {
        assert!(shift_plan(&steps(&[1, 2]), "lan-00000001", 2).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn renumber_is_contiguous_and_collision_free(
            numbers in prop::collection::btree_set(1_i64..60, 0..20)
        ) {
            let lanes = steps(&numbers.iter().copied().collect::<Vec<_>>());
            let mut state: HashMap<String, i64> = lanes.iter().cloned().collect();
            apply_checked(&mut state, &renumber_plan(&lanes)).map_err(TestCaseError::fail)?;
            let expected: Vec<i64> = (1..=i64::try_from(lanes.len()).unwrap()).collect();
            prop_assert_eq!(numbers_of(&state), expected);
        }

        #[test]
        fn shift_preserves_order_of_others(k in 1_i64..15, from in 1_i64..15, to in 1_i64..15) {
            prop_assume!(from <= k && to <= k);
            let numbers: Vec<i64> = (1..=k).collect();
            let lanes = steps(&numbers);
            let dragged = format!("lan-{:08}", from - 1);

            let mut state: HashMap<String, i64> = lanes.iter().cloned().collect();
            let plan = shift_plan(&lanes, &dragged, to).unwrap();
            apply_checked(&mut state, &plan).map_err(TestCaseError::fail)?;

            prop_assert_eq!(numbers_of(&state), numbers.clone());
            prop_assert_eq!(state[&dragged], to);

            let mut others: Vec<(&String, &i64)> =
                state.iter().filter(|(id, _)| **id != dragged).collect();
            others.sort_by_key(|(_, n)| **n);
            let ids: Vec<&String> = others.iter().map(|(id, _)| *id).collect();
            let mut sorted_ids = ids.clone();
            sorted_ids.sort();
            prop_assert_eq!(ids, sorted_ids);
        }

        #[test]
        fn random_operations_keep_numbers_contiguous(
            ops in prop::collection::vec((0_u8..3, 0_usize..32, 1_i64..32), 1..40)
        ) {
            let mut state: HashMap<String, i64> = HashMap::new();
            let mut next = 0_u32;
            for (op, pick, position) in ops {
                let ids: Vec<String> = state.keys().cloned().collect();
                match op {
                    0 => {
                        let number = state.values().max().copied().unwrap_or(0) + 1;
                        state.insert(format!("lan-{next:08}"), number);
                        next += 1;
                    }
                    1 if !ids.is_empty() => {
                        state.remove(&ids[pick % ids.len()]);
                        let lanes: Vec<LaneStep> = state.clone().into_iter().collect();
                        apply_checked(&mut state, &renumber_plan(&lanes)).map_err(TestCaseError::fail)?;
                    }
                    2 if !ids.is_empty() => {
                        let k = i64::try_from(ids.len()).unwrap();
                        let lanes: Vec<LaneStep> = state.clone().into_iter().collect();
                        let target = (position - 1) % k + 1;
                        let plan = shift_plan(&lanes, &ids[pick % ids.len()], target).unwrap();
                        apply_checked(&mut state, &plan).map_err(TestCaseError::fail)?;
                    }
                    _ => {}
                }
                let expected: Vec<i64> = (1..=i64::try_from(state.len()).unwrap()).collect();
                prop_assert_eq!(numbers_of(&state), expected);
            }
        }
    }

    #[tokio::test]
    async fn append_numbers_from_one() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 1, 1).await;
        let entries = seed_entries(&svc, &seed, 3).await;
        let heat = &seed.heats[0][0];

        for entry in &entries {
            append_lane(svc.db().conn(), &heat.id, &entry.id).await.unwrap();
        }
        let numbers: Vec<i64> = svc.lanes_for_heat(&heat.id).await.unwrap().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn removing_first_lane_promotes_second() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 1, 1).await;
        let entries = seed_entries(&svc, &seed, 2).await;
        let heat = &seed.heats[0][0];

        let first = svc.assign_entry_to_heat(&entries[0].id, &heat.id).await.unwrap();
        let second = svc.assign_entry_to_heat(&entries[1].id, &heat.id).await.unwrap();
        assert_eq!((first.number, second.number), (1, 2));

        svc.remove_lane(&first.id).await.unwrap();

        let lanes = svc.lanes_for_heat(&heat.id).await.unwrap();
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].entry_id, entries[1].id);
        assert_eq!(lanes[0].number, 1);
    }

    #[tokio::test]
    async fn reorder_moves_lane_up_and_down() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 1, 1).await;
        let entries = seed_entries(&svc, &seed, 4).await;
        let heat = &seed.heats[0][0];
        let mut lanes = Vec::new();
        for entry in &entries {
            lanes.push(svc.assign_entry_to_heat(&entry.id, &heat.id).await.unwrap());
        }

        let moved = svc.reorder_lane(&lanes[3].id, 1).await.unwrap();
        assert_eq!(moved.number, 1);
        let order: Vec<String> = svc.lanes_for_heat(&heat.id).await.unwrap().into_iter().map(|l| l.entry_id).collect();
        assert_eq!(
            order,
            vec![entries[3].id.clone(), entries[0].id.clone(), entries[1].id.clone(), entries[2].id.clone()]
        );

        svc.reorder_lane(&lanes[3].id, 3).await.unwrap();
        let order: Vec<String> = svc.lanes_for_heat(&heat.id).await.unwrap().into_iter().map(|l| l.entry_id).collect();
        assert_eq!(
            order,
            vec![entries[0].id.clone(), entries[1].id.clone(), entries[3].id.clone(), entries[2].id.clone()]
        );
        assert_contiguous(&svc, &heat.id).await;
    }

    #[tokio::test]
    async fn reorder_out_of_range_changes_nothing() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 1, 1).await;
        let entries = seed_entries(&svc, &seed, 2).await;
        let heat = &seed.heats[0][0];
        let lane = svc.assign_entry_to_heat(&entries[0].id, &heat.id).await.unwrap();
        svc.assign_entry_to_heat(&entries[1].id, &heat.id).await.unwrap();

        let result = svc.reorder_lane(&lane.id, 3).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        assert_eq!(svc.get_lane(&lane.id).await.unwrap().number, 1);
    }

    #[tokio::test]
    async fn unassign_entry_removes_lanes_in_every_workout() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 3, 1).await;
        let entries = seed_entries(&svc, &seed, 3).await;
        let mut first_lane = None;
        for entry in &entries {
            let lane = svc.assign_entry_to_heat(&entry.id, &seed.heats[0][0].id).await.unwrap();
            first_lane.get_or_insert(lane);
        }
        let lane = first_lane.unwrap();

        let removed = svc.unassign_entry(&lane.id).await.unwrap();
        assert_eq!(removed, lane);
        assert!(svc.lanes_for_entry(&entries[0].id).await.unwrap().is_empty());

        for heats in &seed.heats {
            let lanes = svc.lanes_for_heat(&heats[0].id).await.unwrap();
            let remaining: HashSet<&str> = lanes.iter().map(|l| l.entry_id.as_str()).collect();
            assert_eq!(remaining, HashSet::from([entries[1].id.as_str(), entries[2].id.as_str()]));
            assert_contiguous(&svc, &heats[0].id).await;
        }
    }

    #[tokio::test]
    async fn unassign_all_clears_competition_only() {
        let svc = test_service().await;
        let seed = seed_competition(&svc, 2, 1).await;
        let other = seed_competition(&svc, 1, 1).await;
        let entry = seed_entries(&svc, &seed, 1).await.remove(0);
        let outsider = seed_entries(&svc, &other, 1).await.remove(0);
        svc.assign_entry_to_heat(&entry.id, &seed.heats[0][0].id).await.unwrap();
        svc.assign_entry_to_heat(&outsider.id, &other.heats[0][0].id).await.unwrap();

        assert!(svc.unassign_all_entries(&seed.competition.id).await.unwrap());
        assert!(!svc.is_entry_assigned(&entry.id).await.unwrap());
        assert!(svc.is_entry_assigned(&outsider.id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_lane_is_not_found() {
        let svc = test_service().await;
        let result = svc.unassign_entry("lan-missing0").await;
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { entity: EntityKind::Lane, .. })
        ));
    }
}
