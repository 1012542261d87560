//! Calendar rebuild engine.
//!
//! This module implements the yearly mass calendar rebuild: a destructive,
//! priority-ordered reallocation of every intention a user has on file onto
//! the single daily slot of one civil year.
//!
//! A rebuild runs six passes in a fixed order:
//!
//! 1. blocked days are marked (nothing may land on them),
//! 2. fixed intentions claim their month/day or day-of-year targets,
//! 3. deceased masses scan forward from death date + offset,
//! 3.5. Gregorian series fill consecutive free days with pause/resume,
//! 4. personal intentions draw random free days, up to a monthly quota,
//! 5. bulk batches fill every remaining free day in receipt order.
//!
//! Earlier passes always win; later passes only see the days left over.
//! Every decision is recorded in a timestamped note log and every failed
//! placement in a conflict list, both persisted as an audit run record.

pub mod grid;
pub mod lock;
mod passes;


pub use grid::CalendarGrid;
pub use lock::{RunLockRegistry, RunPermit};

use chrono::{SecondsFormat, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::api::RebuildSummary;
use crate::config::SchedulerConfig;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{Conflict, NewSchedulerRun, RunStatus, UserId};

/// Years the rebuild accepts; chrono handles a wider range, but nothing
/// sensible lives outside this one.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Errors that reject a rebuild before any pass runs.
///
/// Everything that goes wrong after the run has started is reported through
/// the summary's `ERROR` status instead, so partial progress stays visible.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Year {year} is outside the schedulable range")]
    InvalidYear { year: i32 },

    #[error("A rebuild for user {user_id} in year {year} is already running")]
    RebuildInProgress { user_id: UserId, year: i32 },
}

/// Working state of one rebuild run.
pub(crate) struct RunState {
    pub(crate) grid: CalendarGrid,
    pub(crate) conflicts: Vec<Conflict>,
    pub(crate) notes: Vec<String>,
}

impl RunState {
    fn new(grid: CalendarGrid) -> Self {
        Self {
            grid,
            conflicts: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Append a timestamped entry to the decision log.
    pub(crate) fn note(&mut self, message: impl Into<String>) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.notes.push(format!("[{}] {}", timestamp, message.into()));
    }

    pub(crate) fn conflict(
        &mut self,
        date: impl Into<String>,
        intention: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.conflicts.push(Conflict::new(date, intention, reason));
    }
}

/// The rebuild engine, generic over the backing store.
///
/// One scheduler serves any number of rebuilds; runs for the same
/// (user, year) are serialized through the [`RunLockRegistry`]. Personal
/// intention placement draws from the scheduler's RNG, so use
/// [`MassScheduler::with_seed`] when reproducible placements matter.
pub struct MassScheduler<R> {
    repo: R,
    config: SchedulerConfig,
    locks: RunLockRegistry,
    rng: SmallRng,
}

impl<R: FullRepository> MassScheduler<R> {
    /// Create a scheduler with entropy-seeded randomness.
    pub fn new(repo: R, config: SchedulerConfig) -> Self {
        Self {
            repo,
            config,
            locks: RunLockRegistry::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a scheduler whose random draws are reproducible from `seed`.
    pub fn with_seed(repo: R, config: SchedulerConfig, seed: u64) -> Self {
        Self {
            repo,
            config,
            locks: RunLockRegistry::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Replace the lock registry, so schedulers sharing a store also share
    /// their in-flight run slots.
    pub fn with_lock_registry(mut self, locks: RunLockRegistry) -> Self {
        self.locks = locks;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Rebuild the full calendar of `user_id` for `year`.
    ///
    /// The run deletes every previously scheduled mass of that user/year and
    /// replays all intentions through the priority passes. `Err` is returned
    /// only for rejections before the run starts (bad year, duplicate run);
    /// once passes execute, failures surface as a summary with status
    /// `ERROR` and the progress made so far.
    pub async fn rebuild_calendar(
        &mut self,
        user_id: UserId,
        year: i32,
    ) -> Result<RebuildSummary, SchedulerError> {
        if !YEAR_RANGE.contains(&year) {
            return Err(SchedulerError::InvalidYear { year });
        }
        let grid = CalendarGrid::new(year).ok_or(SchedulerError::InvalidYear { year })?;
        let _permit = self
            .locks
            .try_acquire(user_id, year)
            .ok_or(SchedulerError::RebuildInProgress { user_id, year })?;

        log::info!(
            "Starting scheduler rebuild for user {} in year {}",
            user_id,
            year
        );

        let mut state = RunState::new(grid);
        state.note(format!(
            "Starting scheduler rebuild for user {} in year {}",
            user_id, year
        ));

        let run_result = self.run_passes(user_id, &mut state).await;

        let (mut status, mut total_scheduled) = match run_result {
            Ok(()) => {
                let status = if state.conflicts.is_empty() {
                    RunStatus::Success
                } else {
                    RunStatus::PartialConflict
                };
                (status, state.grid.scheduled_count())
            }
            Err(err) => {
                log::error!(
                    "Calendar rebuild failed for user {} in year {}: {}",
                    user_id,
                    year,
                    err
                );
                state.note(format!("ERROR: {}", err));
                (RunStatus::Error, 0)
            }
        };

        if let Err(err) = self
            .persist_run(user_id, year, status, total_scheduled, &state)
            .await
        {
            if status == RunStatus::Error {
                log::warn!("Audit record for failed rebuild was not written: {}", err);
            } else {
                // The run itself finished, but its history is gone; the
                // caller has to treat the result as unreliable.
                log::error!(
                    "Audit record write failed after rebuild for user {} in year {}: {}",
                    user_id,
                    year,
                    err
                );
                state.note(format!("ERROR: {}", err));
                status = RunStatus::Error;
                total_scheduled = 0;
            }
        }

        log::info!(
            "Rebuild for user {} in year {} finished with status {} ({} masses, {} conflicts)",
            user_id,
            year,
            status,
            total_scheduled,
            state.conflicts.len()
        );

        Ok(RebuildSummary {
            status,
            total_scheduled,
            conflicts: state.conflicts,
            notes: state.notes,
        })
    }

    /// Wipe the year and run the six passes in priority order.
    async fn run_passes(&mut self, user_id: UserId, state: &mut RunState) -> RepositoryResult<()> {
        let start = state.grid.first_day();
        let end = state.grid.last_day();

        let removed = self.repo.delete_masses_in_range(user_id, start, end).await?;
        log::debug!(
            "Removed {} previously scheduled masses for user {}",
            removed,
            user_id
        );

        self.apply_blocked_days(user_id, state).await?;
        state.note("Priority 1: Marked blocked days");

        self.schedule_fixed_intentions(user_id, state).await?;
        state.note("Priority 2: Scheduled fixed intentions");

        self.schedule_deceased_masses(user_id, state).await?;
        state.note("Priority 3: Scheduled deceased masses");

        self.schedule_gregorian_series(user_id, state).await?;
        state.note("Priority 3.5: Scheduled Gregorian series");

        self.schedule_personal_intentions(user_id, state).await?;
        state.note("Priority 4: Scheduled monthly personal intentions");

        self.fill_with_bulk_batches(user_id, state).await?;
        state.note("Priority 5: Filled gaps with bulk batches");

        Ok(())
    }

    /// Persist the audit record for a finished (or aborted) run.
    async fn persist_run(
        &self,
        user_id: UserId,
        year: i32,
        status: RunStatus,
        total_scheduled: u32,
        state: &RunState,
    ) -> RepositoryResult<()> {
        let conflicts_json = serde_json::to_string(&state.conflicts)?;
        let notes_json = serde_json::to_string(&state.notes)?;

        self.repo
            .insert_run(&NewSchedulerRun {
                user_id,
                year,
                status,
                conflicts_json,
                notes_json,
                total_scheduled,
                total_conflicts: state.conflicts.len() as u32,
            })
            .await?;
        Ok(())
    }
}
