//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using Vec-backed tables, which keeps query order identical to
//! insertion order and makes runs fully deterministic.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// All tables are plain Vecs behind one `RwLock`, so fetches return entities
/// in insertion order, which is the deterministic "store query order" the
/// scheduler's passes rely on.
///
/// # Example
/// ```ignore
/// let repo = LocalRepository::new();
/// repo.add_blocked_day(user, date, "New Year", "HOLIDAY");
/// let days = repo.fetch_blocked_days(user, start, end).await.unwrap();
/// assert_eq!(days.len(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    masses: Vec<ScheduledMass>,
    blocked_days: Vec<BlockedDay>,
    fixed_intentions: Vec<FixedIntention>,
    deceased: Vec<DeceasedRecord>,
    personal: Vec<PersonalIntention>,
    series: Vec<GregorianSeries>,
    batches: Vec<MassBatch>,
    runs: Vec<SchedulerRun>,

    // ID counters
    next_mass_id: i64,
    next_blocked_id: i64,
    next_fixed_id: i64,
    next_deceased_id: i64,
    next_personal_id: i64,
    next_series_id: i64,
    next_batch_id: i64,
    next_run_id: i64,

    // Connection health
    is_healthy: bool,
    // Remaining writes before simulated outage, when armed
    writes_before_failure: Option<u32>,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            masses: Vec::new(),
            blocked_days: Vec::new(),
            fixed_intentions: Vec::new(),
            deceased: Vec::new(),
            personal: Vec::new(),
            series: Vec::new(),
            batches: Vec::new(),
            runs: Vec::new(),
            next_mass_id: 1,
            next_blocked_id: 1,
            next_fixed_id: 1,
            next_deceased_id: 1,
            next_personal_id: 1,
            next_series_id: 1,
            next_batch_id: 1,
            next_run_id: 1,
            is_healthy: true,
            writes_before_failure: None,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    // ==================== Seeding Helpers ====================

    /// Add a blackout day. Helper for setting up data; the id is assigned
    /// automatically.
    pub fn add_blocked_day(
        &self,
        user_id: UserId,
        date: NaiveDate,
        reason: &str,
        category: &str,
    ) -> BlockedDayId {
        let mut data = self.data.write();
        let id = BlockedDayId(data.next_blocked_id);
        data.next_blocked_id += 1;
        data.blocked_days.push(BlockedDay {
            id,
            user_id,
            date,
            reason: reason.to_string(),
            category: category.to_string(),
        });
        id
    }

    /// Add a fixed intention with a clear conflict flag.
    pub fn add_fixed_intention(
        &self,
        user_id: UserId,
        target: FixedTarget,
        category: &str,
        description: &str,
    ) -> FixedIntentionId {
        let mut data = self.data.write();
        let id = FixedIntentionId(data.next_fixed_id);
        data.next_fixed_id += 1;
        data.fixed_intentions.push(FixedIntention {
            id,
            user_id,
            target,
            category: category.to_string(),
            description: description.to_string(),
            conflict_flag: false,
        });
        id
    }

    /// Add a deceased record with no scheduled date yet.
    pub fn add_deceased(
        &self,
        user_id: UserId,
        name: &str,
        date_of_death: NaiveDate,
        schedule_override: Option<NaiveDate>,
    ) -> DeceasedId {
        let mut data = self.data.write();
        let id = DeceasedId(data.next_deceased_id);
        data.next_deceased_id += 1;
        data.deceased.push(DeceasedRecord {
            id,
            user_id,
            name: name.to_string(),
            date_of_death,
            schedule_override,
            scheduled_date: None,
            conflict_flag: false,
        });
        id
    }

    /// Add a personal intention owned by `month`.
    pub fn add_personal_intention(
        &self,
        user_id: UserId,
        month: u32,
        description: &str,
    ) -> PersonalIntentionId {
        let mut data = self.data.write();
        let id = PersonalIntentionId(data.next_personal_id);
        data.next_personal_id += 1;
        data.personal.push(PersonalIntention {
            id,
            user_id,
            month,
            description: description.to_string(),
            scheduled_date: None,
        });
        id
    }

    /// Add a batch with a zero scheduled count.
    pub fn add_batch(
        &self,
        user_id: UserId,
        code: &str,
        kind: BatchKind,
        total_count: u32,
        start_index: u32,
        date_received: NaiveDate,
    ) -> BatchId {
        let mut data = self.data.write();
        let id = BatchId(data.next_batch_id);
        data.next_batch_id += 1;
        data.batches.push(MassBatch {
            id,
            user_id,
            code: code.to_string(),
            kind,
            total_count,
            start_index,
            scheduled_count: 0,
            date_received,
        });
        id
    }

    /// Add a PENDING Gregorian series with nothing completed.
    pub fn add_series(
        &self,
        user_id: UserId,
        donor_name: &str,
        batch_id: BatchId,
        start_date: Option<NaiveDate>,
    ) -> GregorianSeriesId {
        let mut data = self.data.write();
        let id = GregorianSeriesId(data.next_series_id);
        data.next_series_id += 1;
        data.series.push(GregorianSeries {
            id,
            user_id,
            donor_name: donor_name.to_string(),
            batch_id,
            start_date,
            completed: 0,
            checkpoint: None,
            status: SeriesStatus::Pending,
        });
        id
    }

    // ==================== Test Introspection ====================

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Arm a simulated outage: the next `n` write operations succeed, every
    /// later one fails with a connection error. Pass `None` to disarm.
    pub fn fail_after_writes(&self, n: Option<u32>) {
        let mut data = self.data.write();
        data.writes_before_failure = n;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Number of scheduled masses currently stored.
    pub fn mass_count(&self) -> usize {
        self.data.read().masses.len()
    }

    /// Number of audit runs currently stored.
    pub fn run_count(&self) -> usize {
        self.data.read().runs.len()
    }

    /// Fetch one fixed intention by id, if present.
    pub fn fixed_intention(&self, id: FixedIntentionId) -> Option<FixedIntention> {
        let data = self.data.read();
        data.fixed_intentions.iter().find(|i| i.id == id).cloned()
    }

    /// Fetch one deceased record by id, if present.
    pub fn deceased_record(&self, id: DeceasedId) -> Option<DeceasedRecord> {
        let data = self.data.read();
        data.deceased.iter().find(|d| d.id == id).cloned()
    }

    /// Fetch one series by id, if present.
    pub fn series(&self, id: GregorianSeriesId) -> Option<GregorianSeries> {
        let data = self.data.read();
        data.series.iter().find(|s| s.id == id).cloned()
    }

    /// Fetch one batch by id, if present.
    pub fn batch(&self, id: BatchId) -> Option<MassBatch> {
        let data = self.data.read();
        data.batches.iter().find(|b| b.id == id).cloned()
    }

    /// Fetch one personal intention by id, if present.
    pub fn personal_intention(&self, id: PersonalIntentionId) -> Option<PersonalIntention> {
        let data = self.data.read();
        data.personal.iter().find(|p| p.id == id).cloned()
    }

    // ==================== Internals ====================

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Store is not healthy"));
        }
        Ok(())
    }

    /// Health check plus outage countdown; every write path goes through
    /// this before touching a table.
    fn check_write(&self) -> RepositoryResult<()> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Store is not healthy"));
        }
        if let Some(remaining) = data.writes_before_failure {
            if remaining == 0 {
                return Err(RepositoryError::connection_with_context(
                    "Simulated write outage",
                    ErrorContext::new("check_write").with_details("writes_before_failure=0"),
                ));
            }
            data.writes_before_failure = Some(remaining - 1);
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MassRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data.is_healthy)
    }

    async fn delete_masses_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<u64> {
        self.check_write()?;
        let mut data = self.data.write();
        let before = data.masses.len();
        data.masses
            .retain(|m| !(m.user_id == user_id && m.date >= start && m.date <= end));
        Ok((before - data.masses.len()) as u64)
    }

    async fn insert_mass(&self, mass: &NewScheduledMass) -> RepositoryResult<ScheduledMassId> {
        self.check_write()?;
        let mut data = self.data.write();
        let id = ScheduledMassId(data.next_mass_id);
        data.next_mass_id += 1;
        data.masses.push(ScheduledMass {
            id,
            user_id: mass.user_id,
            date: mass.date,
            description: mass.description.clone(),
            serial_number: mass.serial_number,
            source: mass.source,
        });
        Ok(id)
    }

    async fn fetch_masses_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduledMass>> {
        self.check_health()?;
        let data = self.data.read();
        let mut masses: Vec<ScheduledMass> = data
            .masses
            .iter()
            .filter(|m| m.user_id == user_id && m.date >= start && m.date <= end)
            .cloned()
            .collect();
        masses.sort_by_key(|m| m.date);
        Ok(masses)
    }
}

#[async_trait]
impl IntentionRepository for LocalRepository {
    async fn fetch_blocked_days(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<BlockedDay>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .blocked_days
            .iter()
            .filter(|b| b.user_id == user_id && b.date >= start && b.date <= end)
            .cloned()
            .collect())
    }

    async fn fetch_fixed_intentions(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<FixedIntention>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .fixed_intentions
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_fixed_intention_conflict(
        &self,
        id: FixedIntentionId,
        conflict: bool,
    ) -> RepositoryResult<()> {
        self.check_write()?;
        let mut data = self.data.write();
        match data.fixed_intentions.iter_mut().find(|i| i.id == id) {
            Some(intention) => {
                intention.conflict_flag = conflict;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Fixed intention {} not found",
                id
            ))),
        }
    }

    async fn fetch_deceased_records(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<DeceasedRecord>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .deceased
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_deceased_outcome(
        &self,
        id: DeceasedId,
        scheduled_date: Option<NaiveDate>,
        conflict: bool,
    ) -> RepositoryResult<()> {
        self.check_write()?;
        let mut data = self.data.write();
        match data.deceased.iter_mut().find(|d| d.id == id) {
            Some(record) => {
                record.scheduled_date = scheduled_date;
                record.conflict_flag = conflict;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Deceased record {} not found",
                id
            ))),
        }
    }

    async fn fetch_personal_intentions(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<PersonalIntention>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .personal
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_personal_intention_date(
        &self,
        id: PersonalIntentionId,
        scheduled_date: Option<NaiveDate>,
    ) -> RepositoryResult<()> {
        self.check_write()?;
        let mut data = self.data.write();
        match data.personal.iter_mut().find(|p| p.id == id) {
            Some(intention) => {
                intention.scheduled_date = scheduled_date;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Personal intention {} not found",
                id
            ))),
        }
    }
}

#[async_trait]
impl SeriesRepository for LocalRepository {
    async fn insert_batch(&self, batch: &NewBatch) -> RepositoryResult<BatchId> {
        self.check_write()?;
        let mut data = self.data.write();
        let id = BatchId(data.next_batch_id);
        data.next_batch_id += 1;
        data.batches.push(MassBatch {
            id,
            user_id: batch.user_id,
            code: batch.code.clone(),
            kind: batch.kind,
            total_count: batch.total_count,
            start_index: batch.start_index,
            scheduled_count: 0,
            date_received: batch.date_received,
        });
        Ok(id)
    }

    async fn fetch_fillable_batches(&self, user_id: UserId) -> RepositoryResult<Vec<MassBatch>> {
        self.check_health()?;
        let data = self.data.read();
        let mut batches: Vec<MassBatch> = data
            .batches
            .iter()
            .filter(|b| b.user_id == user_id && b.is_fillable())
            .cloned()
            .collect();
        batches.sort_by_key(|b| b.date_received);
        Ok(batches)
    }

    async fn list_batches(&self, user_id: UserId) -> RepositoryResult<Vec<MassBatch>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .batches
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_batch_scheduled_count(&self, id: BatchId, count: u32) -> RepositoryResult<()> {
        self.check_write()?;
        let mut data = self.data.write();
        match data.batches.iter_mut().find(|b| b.id == id) {
            Some(batch) => {
                batch.scheduled_count = count;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Batch {} not found",
                id
            ))),
        }
    }

    async fn insert_gregorian_series(
        &self,
        series: &NewGregorianSeries,
    ) -> RepositoryResult<GregorianSeriesId> {
        self.check_write()?;
        let mut data = self.data.write();
        let id = GregorianSeriesId(data.next_series_id);
        data.next_series_id += 1;
        data.series.push(GregorianSeries {
            id,
            user_id: series.user_id,
            donor_name: series.donor_name.clone(),
            batch_id: series.batch_id,
            start_date: series.start_date,
            completed: 0,
            checkpoint: None,
            status: SeriesStatus::Pending,
        });
        Ok(id)
    }

    async fn fetch_open_series(&self, user_id: UserId) -> RepositoryResult<Vec<GregorianSeries>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .series
            .iter()
            .filter(|s| s.user_id == user_id && s.status.is_open())
            .cloned()
            .collect())
    }

    async fn set_series_progress(
        &self,
        id: GregorianSeriesId,
        completed: u32,
        checkpoint: Option<NaiveDate>,
        status: SeriesStatus,
    ) -> RepositoryResult<()> {
        self.check_write()?;
        let mut data = self.data.write();
        match data.series.iter_mut().find(|s| s.id == id) {
            Some(series) => {
                series.completed = completed;
                series.checkpoint = checkpoint;
                series.status = status;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Gregorian series {} not found",
                id
            ))),
        }
    }
}

#[async_trait]
impl AuditRepository for LocalRepository {
    async fn insert_run(&self, run: &NewSchedulerRun) -> RepositoryResult<SchedulerRunId> {
        self.check_write()?;
        let mut data = self.data.write();
        let id = SchedulerRunId(data.next_run_id);
        data.next_run_id += 1;
        data.runs.push(SchedulerRun {
            id,
            user_id: run.user_id,
            year: run.year,
            status: run.status,
            conflicts_json: run.conflicts_json.clone(),
            notes_json: run.notes_json.clone(),
            total_scheduled: run.total_scheduled,
            total_conflicts: run.total_conflicts,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn latest_run(&self, user_id: UserId) -> RepositoryResult<Option<SchedulerRun>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .runs
            .iter()
            .rev()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn list_runs(&self, user_id: UserId) -> RepositoryResult<Vec<SchedulerRun>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .runs
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
