//! End-to-end scheduling scenarios
//!
//! - Lane removal closes gaps
//! - Round capacity linkage across workouts
//! - Paired deletion guard (all-or-nothing)
//! - Cross-workout move atomicity
//! - Workout teardown
//! - On-disk persistence across reopen

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use heat_config::{HeatConfig, SchedulerConfig};
use heat_core::entities::{Competition, Entry, Heat, TicketType, Workout};
use heat_core::enums::{EntryKind, HeatState};
use heat_core::requests::{CapacityChange, NewHeat};
use heat_db::HeatDb;
use heat_db::error::DatabaseError;
use heat_db::service::HeatService;

struct Round {
    competition: Competition,
    rx: TicketType,
    workouts: Vec<Workout>,
    heats: Vec<Vec<Heat>>,
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 2, hour, 0, 0).unwrap()
}

async fn test_service() -> HeatService {
    HeatService::new_local(":memory:").await.unwrap()
}

async fn schedule(svc: &HeatService, workouts: usize, heats_per_workout: u32) -> Round {
    let competition = svc.create_competition("Summer Games", Some(10)).await.unwrap();
    let rx = svc
        .create_ticket_type(&competition.id, "RX", 1, false)
        .await
        .unwrap();

    let mut created = Vec::new();
    let mut heats = Vec::new();
    for w in 0..workouts {
        let workout = svc
            .create_workout(&competition.id, &format!("Event {}", w + 1))
            .await
            .unwrap();
        let requested: Vec<NewHeat> = (0..heats_per_workout)
            .map(|i| NewHeat { workout_id: workout.id.clone(), start_time: at(8 + i) })
            .collect();
        heats.push(svc.create_heats(&competition.id, &requested).await.unwrap());
        created.push(workout);
    }
    Round { competition, rx, workouts: created, heats }
}

async fn athlete(svc: &HeatService, round: &Round, name: &str) -> Entry {
    svc.create_entry(&round.competition.id, Some(&round.rx.id), EntryKind::Individual, name)
        .await
        .unwrap()
}

async fn lane_numbers(svc: &HeatService, heat_id: &str) -> Vec<(String, i64)> {
    svc.lanes_for_heat(heat_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| (l.entry_id, l.number))
        .collect()
}

// ---------------------------------------------------------------------------
// Lane removal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn removing_entry_one_promotes_entry_two() {
    let svc = test_service().await;
    let round = schedule(&svc, 1, 1).await;
    let heat = &round.heats[0][0];
    let one = athlete(&svc, &round, "Entry1").await;
    let two = athlete(&svc, &round, "Entry2").await;

    let lane_one = svc.assign_entry_to_heat(&one.id, &heat.id).await.unwrap();
    svc.assign_entry_to_heat(&two.id, &heat.id).await.unwrap();
    assert_eq!(
        lane_numbers(&svc, &heat.id).await,
        vec![(one.id.clone(), 1), (two.id.clone(), 2)]
    );

    svc.remove_lane(&lane_one.id).await.unwrap();
    assert_eq!(lane_numbers(&svc, &heat.id).await, vec![(two.id, 1)]);
}

// ---------------------------------------------------------------------------
// Capacity linkage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn capacity_update_reaches_second_workout() {
    let svc = test_service().await;
    let round = schedule(&svc, 2, 1).await;

    let outcomes = svc
        .update_heat_capacities(&[CapacityChange {
            heat_id: round.heats[0][0].id.clone(),
            max_entries: 15,
        }])
        .await
        .unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let other = svc.get_heat(&round.heats[1][0].id).await.unwrap();
    assert_eq!(other.max_limit_per_heat, 15);
}

// ---------------------------------------------------------------------------
// Deletion guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_blocked_when_one_linked_heat_is_occupied() {
    let svc = test_service().await;
    let round = schedule(&svc, 2, 2).await;
    let entry = athlete(&svc, &round, "Solo").await;

    svc.assign_entry_to_heat(&entry.id, &round.heats[0][1].id).await.unwrap();
    let projected = svc.lanes_for_heat(&round.heats[1][1].id).await.unwrap().remove(0);
    svc.remove_lane(&projected.id).await.unwrap();
    assert_eq!(svc.heat_state(&round.heats[1][1].id).await.unwrap(), HeatState::Empty);

    let result = svc.delete_heat(&round.heats[1][1].id).await;
    assert!(matches!(result, Err(DatabaseError::Conflict(_))));

    for (w, workout) in round.workouts.iter().enumerate() {
        assert_eq!(svc.heats_for_workout(&workout.id).await.unwrap(), round.heats[w]);
    }
    assert_eq!(svc.lanes_for_entry(&entry.id).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Move atomicity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn move_updates_every_workout_with_both_rounds() {
    let svc = test_service().await;
    let round = schedule(&svc, 3, 3).await;
    let entries = [
        athlete(&svc, &round, "A").await,
        athlete(&svc, &round, "B").await,
    ];
    for entry in &entries {
        svc.assign_entry_to_heat(&entry.id, &round.heats[0][0].id).await.unwrap();
    }

    let lane = svc.lanes_for_heat(&round.heats[0][0].id).await.unwrap().remove(0);
    svc.move_lane_to_heat(&lane.id, &round.heats[0][2].id).await.unwrap();

    for heats in &round.heats {
        assert_eq!(lane_numbers(&svc, &heats[0].id).await, vec![(entries[1].id.clone(), 1)]);
        assert_eq!(lane_numbers(&svc, &heats[2].id).await, vec![(entries[0].id.clone(), 1)]);
    }
}

#[tokio::test]
async fn failed_move_leaves_every_workout_unchanged() {
    let db = HeatDb::open_local(":memory:").await.unwrap();
    let svc = HeatService::from_db(
        db,
        SchedulerConfig {
            default_max_per_heat: 1,
            enforce_capacity: true,
        },
    );
    let competition = svc.create_competition("Tight", None).await.unwrap();
    let rx = svc.create_ticket_type(&competition.id, "RX", 1, false).await.unwrap();
    let mut heats = Vec::new();
    for name in ["Event 1", "Event 2"] {
        let workout = svc.create_workout(&competition.id, name).await.unwrap();
        heats.push(
            svc.create_heats(
                &competition.id,
                &[
                    NewHeat { workout_id: workout.id.clone(), start_time: at(8) },
                    NewHeat { workout_id: workout.id.clone(), start_time: at(9) },
                ],
            )
            .await
            .unwrap(),
        );
    }
    let mover = svc
        .create_entry(&competition.id, Some(&rx.id), EntryKind::Team, "Movers")
        .await
        .unwrap();
    let blocker = svc
        .create_entry(&competition.id, Some(&rx.id), EntryKind::Team, "Blockers")
        .await
        .unwrap();
    let lane = svc.assign_entry_to_heat(&mover.id, &heats[0][0].id).await.unwrap();
    let blocking = svc.assign_entry_to_heat(&blocker.id, &heats[0][1].id).await.unwrap();
    svc.remove_lane(&blocking.id).await.unwrap();

    let before: Vec<Vec<(String, i64)>> = {
        let mut all = Vec::new();
        for workout_heats in &heats {
            for heat in workout_heats {
                all.push(lane_numbers(&svc, &heat.id).await);
            }
        }
        all
    };

    let result = svc.move_lane_to_heat(&lane.id, &heats[0][1].id).await;
    assert!(matches!(result, Err(DatabaseError::Conflict(_))));

    let mut after = Vec::new();
    for workout_heats in &heats {
        for heat in workout_heats {
            after.push(lane_numbers(&svc, &heat.id).await);
        }
    }
    assert_eq!(after, before);
}

// ---------------------------------------------------------------------------
// Teardown and unassignment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unassign_and_delete_workout() {
    let svc = test_service().await;
    let round = schedule(&svc, 2, 2).await;
    let a = athlete(&svc, &round, "A").await;
    let b = athlete(&svc, &round, "B").await;
    let lane_a = svc.assign_entry_to_heat(&a.id, &round.heats[0][0].id).await.unwrap();
    svc.assign_entry_to_heat(&b.id, &round.heats[0][0].id).await.unwrap();

    svc.unassign_entry(&lane_a.id).await.unwrap();
    assert_eq!(
        svc.unassigned_entries(&round.competition.id).await.unwrap(),
        vec![a.clone()]
    );
    for heats in &round.heats {
        assert_eq!(lane_numbers(&svc, &heats[0].id).await, vec![(b.id.clone(), 1)]);
    }

    let deleted = svc.delete_workout(&round.workouts[1].id).await.unwrap();
    assert_eq!(deleted.id, round.workouts[1].id);
    assert_eq!(svc.workouts_for_competition(&round.competition.id).await.unwrap().len(), 1);
    assert_eq!(svc.lanes_for_entry(&b.id).await.unwrap().len(), 1);

    assert!(svc.unassign_all_entries(&round.competition.id).await.unwrap());
    assert_eq!(svc.unassigned_entries(&round.competition.id).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn schedule_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("heat.db");
    let path = path.to_str().unwrap();

    let (heat_id, entry_id) = {
        let svc = HeatService::new_local(path).await.unwrap();
        let round = schedule(&svc, 2, 1).await;
        let entry = athlete(&svc, &round, "Persisted").await;
        svc.assign_entry_to_heat(&entry.id, &round.heats[0][0].id).await.unwrap();
        (round.heats[1][0].id.clone(), entry.id)
    };

    let mut config = HeatConfig::default();
    config.database.path = path.to_string();
    let svc = HeatService::from_config(&config).await.unwrap();
    assert_eq!(lane_numbers(&svc, &heat_id).await, vec![(entry_id, 1)]);
    assert_eq!(svc.heat_state(&heat_id).await.unwrap(), HeatState::Occupied);
}
