//! Expanded tests for LocalRepository.
//!
//! These tests cover concurrent access patterns and trait-object usage for
//! the in-memory repository, beyond the module's own unit tests.

use std::sync::Arc;

use chrono::NaiveDate;
use mis_rust::db::repositories::LocalRepository;
use mis_rust::db::repository::{
    AuditRepository, FullRepository, IntentionRepository, MassRepository, SeriesRepository,
};
use mis_rust::models::{
    BatchKind, FixedIntentionId, FixedTarget, MassSource, NewSchedulerRun, NewScheduledMass,
    RunStatus, SeriesStatus, UserId,
};

const USER: UserId = UserId(1);

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_mass(user: UserId, day: NaiveDate, description: &str) -> NewScheduledMass {
    NewScheduledMass {
        user_id: user,
        date: day,
        description: description.to_string(),
        serial_number: None,
        source: MassSource::Fixed(FixedIntentionId(1)),
    }
}

fn run_record(year: i32) -> NewSchedulerRun {
    NewSchedulerRun {
        user_id: USER,
        year,
        status: RunStatus::Success,
        conflicts_json: "[]".to_string(),
        notes_json: "[]".to_string(),
        total_scheduled: 10,
        total_conflicts: 0,
    }
}

// =========================================================
// Concurrent Access Tests
// =========================================================

#[tokio::test]
async fn test_concurrent_inserts_from_many_tasks() {
    let repo = Arc::new(LocalRepository::new());

    let mut handles = vec![];
    for task in 0..10u32 {
        let repo_clone = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            for day in 1..=5 {
                let mass = new_mass(
                    UserId(task as i64 + 1),
                    date(2026, 1, day),
                    &format!("Task {} mass {}", task, day),
                );
                repo_clone.insert_mass(&mass).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(repo.mass_count(), 50);

    // Every task sees only its own user's rows.
    let first_user = repo
        .fetch_masses_in_range(UserId(1), date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(first_user.len(), 5);
}

#[tokio::test]
async fn test_concurrent_reads_during_writes() {
    let repo = Arc::new(LocalRepository::new());
    repo.insert_mass(&new_mass(USER, date(2026, 3, 1), "Seed"))
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 0..5u32 {
        let writer = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            writer
                .insert_mass(&new_mass(USER, date(2026, 4, i + 1), "Writer"))
                .await
                .map(|_| 0usize)
        }));
        let reader = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            reader
                .fetch_masses_in_range(USER, date(2026, 1, 1), date(2026, 12, 31))
                .await
                .map(|masses| masses.len())
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(repo.mass_count(), 6);
}

// =========================================================
// Trait Object Usage
// =========================================================

#[tokio::test]
async fn test_full_repository_as_trait_object() {
    let local = LocalRepository::new();
    local.add_blocked_day(USER, date(2026, 1, 1), "New Year", "HOLIDAY");
    let batch = local.add_batch(USER, "B-1", BatchKind::Bulk, 5, 1, date(2026, 1, 2));
    local.add_series(USER, "Donor", batch, Some(date(2026, 2, 1)));

    // Clones share storage, so the trait object sees the seeded rows.
    let repo: Arc<dyn FullRepository> = Arc::new(local.clone());

    let blocked = repo
        .fetch_blocked_days(USER, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(blocked.len(), 1);

    let batches = repo.fetch_fillable_batches(USER).await.unwrap();
    assert_eq!(batches.len(), 1);

    let series = repo.fetch_open_series(USER).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].status, SeriesStatus::Pending);

    repo.insert_mass(&new_mass(USER, date(2026, 1, 2), "Via trait object"))
        .await
        .unwrap();
    assert_eq!(local.mass_count(), 1);
}

// =========================================================
// Write-Back and Bookkeeping
// =========================================================

#[tokio::test]
async fn test_write_backs_update_each_catalog() {
    let repo = LocalRepository::new();
    let fixed = repo.add_fixed_intention(
        USER,
        FixedTarget::MonthDay { month: 2, day: 29 },
        "ANNIVERSARY",
        "Leap-day anniversary",
    );
    let deceased = repo.add_deceased(USER, "Maria Vidal", date(2026, 3, 1), None);
    let personal = repo.add_personal_intention(USER, 6, "For the parish");
    let batch = repo.add_batch(USER, "B-9", BatchKind::Donor, 8, 1, date(2026, 1, 5));
    let series = repo.add_series(USER, "Anna Kowalska", batch, None);

    repo.set_fixed_intention_conflict(fixed, true).await.unwrap();
    repo.set_deceased_outcome(deceased, Some(date(2026, 3, 3)), false)
        .await
        .unwrap();
    repo.set_personal_intention_date(personal, Some(date(2026, 6, 11)))
        .await
        .unwrap();
    repo.set_batch_scheduled_count(batch, 8).await.unwrap();
    repo.set_series_progress(series, 12, Some(date(2026, 4, 2)), SeriesStatus::InProgress)
        .await
        .unwrap();

    assert!(repo.fixed_intention(fixed).unwrap().conflict_flag);
    let record = repo.deceased_record(deceased).unwrap();
    assert_eq!(record.scheduled_date, Some(date(2026, 3, 3)));
    assert!(!record.conflict_flag);
    assert_eq!(
        repo.personal_intention(personal).unwrap().scheduled_date,
        Some(date(2026, 6, 11))
    );
    assert_eq!(repo.batch(batch).unwrap().scheduled_count, 8);
    let progressed = repo.series(series).unwrap();
    assert_eq!(progressed.completed, 12);
    assert_eq!(progressed.checkpoint, Some(date(2026, 4, 2)));
    assert_eq!(progressed.status, SeriesStatus::InProgress);
}

#[tokio::test]
async fn test_clear_keeps_health_state() {
    let repo = LocalRepository::new();
    repo.insert_mass(&new_mass(USER, date(2026, 5, 1), "Gone after clear"))
        .await
        .unwrap();
    repo.set_healthy(false);

    repo.clear();

    assert_eq!(repo.mass_count(), 0);
    assert!(!repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_run_history_is_newest_first() {
    let repo = LocalRepository::new();
    for year in [2026, 2027, 2028] {
        repo.insert_run(&run_record(year)).await.unwrap();
    }

    let runs = repo.list_runs(USER).await.unwrap();
    let years: Vec<i32> = runs.iter().map(|run| run.year).collect();
    assert_eq!(years, vec![2028, 2027, 2026]);

    let latest = repo.latest_run(USER).await.unwrap().unwrap();
    assert_eq!(latest.year, 2028);
    assert_eq!(latest.status, RunStatus::Success);
}

#[tokio::test]
async fn test_exhausted_write_budget_leaves_reads_working() {
    let repo = LocalRepository::new();
    repo.insert_mass(&new_mass(USER, date(2026, 7, 1), "Before outage"))
        .await
        .unwrap();
    repo.fail_after_writes(Some(0));

    let denied = new_mass(USER, date(2026, 7, 2), "During outage");
    assert!(repo.insert_mass(&denied).await.is_err());

    let masses = repo
        .fetch_masses_in_range(USER, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(masses.len(), 1);

    repo.fail_after_writes(None);
    assert!(repo
        .insert_mass(&new_mass(USER, date(2026, 7, 3), "After recovery"))
        .await
        .is_ok());
}
