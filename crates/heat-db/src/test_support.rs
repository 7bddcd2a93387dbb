//! Shared test utilities for heat-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::{DateTime, TimeZone, Utc};
    use heat_config::SchedulerConfig;
    use heat_core::entities::{Competition, Entry, Heat, TicketType, Workout};
    use heat_core::enums::EntryKind;
    use heat_core::requests::NewHeat;

    use crate::HeatDb;
    use crate::service::HeatService;

    /// In-memory service with default scheduler settings.
    pub async fn test_service() -> HeatService {
        let db = HeatDb::open_local(":memory:").await.unwrap();
        HeatService::from_db(db, SchedulerConfig::default())
    }

    /// In-memory service that enforces heat capacity, with `capacity` as the
    /// default for new competitions.
    pub async fn test_service_enforcing(capacity: i64) -> HeatService {
        let db = HeatDb::open_local(":memory:").await.unwrap();
        HeatService::from_db(
            db,
            SchedulerConfig {
                default_max_per_heat: capacity,
                enforce_capacity: true,
            },
        )
    }

    /// A time on competition day.
    pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    pub struct Seed {
        pub competition: Competition,
        /// Competing ticket type; every seeded heat lists it.
        pub rx: TicketType,
        pub workouts: Vec<Workout>,
        /// `heats[w][i]` is the heat at index `i` of workout `w`.
        pub heats: Vec<Vec<Heat>>,
    }

    /// Competition with an RX and a volunteer ticket type, `workouts`
    /// workouts, and `heats_per_workout` hourly heats in each from 09:00.
    pub async fn seed_competition(svc: &HeatService, workouts: usize, heats_per_workout: usize) -> Seed {
        let competition = svc.create_competition("Throwdown", None).await.unwrap();
        let rx = svc
            .create_ticket_type(&competition.id, "RX", 1, false)
            .await
            .unwrap();
        svc.create_ticket_type(&competition.id, "Volunteer", 1, true)
            .await
            .unwrap();

        let mut seeded_workouts = Vec::new();
        let mut heats = Vec::new();
        for w in 0..workouts {
            let workout = svc
                .create_workout(&competition.id, &format!("Workout {}", w + 1))
                .await
                .unwrap();
            let requested: Vec<NewHeat> = (0..heats_per_workout)
                .map(|i| NewHeat {
                    workout_id: workout.id.clone(),
                    start_time: at(9 + u32::try_from(i).unwrap(), 0),
                })
                .collect();
            heats.push(svc.create_heats(&competition.id, &requested).await.unwrap());
            seeded_workouts.push(workout);
        }

        Seed {
            competition,
            rx,
            workouts: seeded_workouts,
            heats,
        }
    }

    /// `count` individual RX entries named "Athlete 1", "Athlete 2", ...
    pub async fn seed_entries(svc: &HeatService, seed: &Seed, count: usize) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(count);
        for n in 1..=count {
            entries.push(
                svc.create_entry(
                    &seed.competition.id,
                    Some(&seed.rx.id),
                    EntryKind::Individual,
                    &format!("Athlete {n}"),
                )
                .await
                .unwrap(),
            );
        }
        entries
    }

    /// Lane numbers of the heat are exactly `1..=k`.
    pub async fn assert_contiguous(svc: &HeatService, heat_id: &str) {
        let numbers: Vec<i64> = svc
            .lanes_for_heat(heat_id)
            .await
            .unwrap()
            .iter()
            .map(|l| l.number)
            .collect();
        let expected: Vec<i64> = (1..=i64::try_from(numbers.len()).unwrap()).collect();
        assert_eq!(numbers, expected, "lanes of {heat_id} are not contiguous");
    }
}
