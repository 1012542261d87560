//! Priority passes of the calendar rebuild.
//!
//! Each pass fetches its entities, decides every placement against the grid,
//! and issues one explicit store write per entity with the outcome. The
//! orchestrator in the parent module runs them in priority order and stops
//! at the first store failure.

use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use super::{MassScheduler, RunState};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{
    FixedIntention, FixedTarget, MassSource, NewScheduledMass, PersonalIntention,
    PersonalIntentionId, SeriesStatus, UserId,
};

/// Conflict label of a fixed intention: its description, or the bare
/// category when no description was given.
fn intention_label(intention: &FixedIntention) -> &str {
    if intention.description.is_empty() {
        &intention.category
    } else {
        &intention.description
    }
}

impl<R: FullRepository> MassScheduler<R> {
    /// Store one mass and claim its grid day.
    ///
    /// Returns `Ok(false)` without writing when the day is not free; the
    /// passes pre-check availability, so `false` only guards against their
    /// bookkeeping drifting from the grid.
    async fn place_mass(&self, state: &mut RunState, mass: NewScheduledMass) -> RepositoryResult<bool> {
        if !state.grid.is_free(mass.date) {
            return Ok(false);
        }
        let id = self.repo.insert_mass(&mass).await?;
        state.grid.occupy(mass.date, id);
        log::debug!("Placed {} mass on {}", mass.source.kind(), mass.date);
        Ok(true)
    }

    /// Priority 1: mark blackout days; nothing may land on them.
    pub(crate) async fn apply_blocked_days(
        &self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let blocked = self
            .repo
            .fetch_blocked_days(user_id, state.grid.first_day(), state.grid.last_day())
            .await?;

        for day in &blocked {
            if state.grid.block(day.date) {
                state.note(format!("Blocked: {} - {}", day.date, day.reason));
            }
        }
        Ok(())
    }

    /// Priority 2: place fixed intentions on their month/day or day-of-year
    /// targets, recording a conflict when the target day is unavailable.
    pub(crate) async fn schedule_fixed_intentions(
        &self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let intentions = self.repo.fetch_fixed_intentions(user_id).await?;
        let year = state.grid.year();
        let mut flags = Vec::with_capacity(intentions.len());

        for intention in &intentions {
            let label = intention_label(intention);
            let mut conflict = false;

            let target = match intention.target {
                FixedTarget::MonthDay { month, day } => {
                    match NaiveDate::from_ymd_opt(year, month, day) {
                        // Recurring targets already past the run start roll
                        // into the next year.
                        Some(date) if date < state.grid.first_day() => date.with_year(year + 1),
                        Some(date) => Some(date),
                        None => {
                            conflict = true;
                            state.conflict(
                                format!("{}-{:02}-{:02}", year, month, day),
                                label,
                                "No such calendar day",
                            );
                            None
                        }
                    }
                }
                FixedTarget::DayOfYear(offset) => NaiveDate::from_yo_opt(year, offset),
            };

            if let Some(date) = target {
                if state.grid.contains(date) {
                    if state.grid.is_blocked(date) {
                        conflict = true;
                        state.conflict(date.to_string(), label, "Day is blocked");
                    } else if state.grid.is_occupied(date) {
                        conflict = true;
                        state.conflict(date.to_string(), label, "Day already scheduled");
                    } else {
                        let description = intention.display_description();
                        self.place_mass(
                            state,
                            NewScheduledMass {
                                user_id,
                                date,
                                description: description.clone(),
                                serial_number: None,
                                source: MassSource::Fixed(intention.id),
                            },
                        )
                        .await?;
                        state.note(format!(
                            "Fixed intention scheduled: {} - {}",
                            date, description
                        ));
                    }
                }
            }

            flags.push((intention.id, conflict));
        }

        // Persist every flag, clearing the ones from prior runs.
        for (id, conflict) in flags {
            self.repo.set_fixed_intention_conflict(id, conflict).await?;
        }
        Ok(())
    }

    /// Priority 3: place one mass per deceased record, scanning forward from
    /// the death date plus the configured offset (or a manual override).
    pub(crate) async fn schedule_deceased_masses(
        &self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let records = self.repo.fetch_deceased_records(user_id).await?;
        let offset = Duration::days(self.config.deceased_offset_days);

        for record in &records {
            let target = match record.schedule_override {
                Some(date) => date,
                None => record
                    .date_of_death
                    .checked_add_signed(offset)
                    .unwrap_or(record.date_of_death),
            };

            let scan_from = target.max(state.grid.first_day());
            match state.grid.first_free_on_or_after(scan_from) {
                Some(date) => {
                    self.place_mass(
                        state,
                        NewScheduledMass {
                            user_id,
                            date,
                            description: format!("Deceased: {}", record.name),
                            serial_number: None,
                            source: MassSource::Deceased(record.id),
                        },
                    )
                    .await?;
                    state.note(format!(
                        "Deceased mass scheduled: {} for {}",
                        date, record.name
                    ));
                    self.repo
                        .set_deceased_outcome(record.id, Some(date), false)
                        .await?;
                }
                None => {
                    state.conflict(
                        target.to_string(),
                        format!("Deceased: {}", record.name),
                        "No available slots remaining in calendar",
                    );
                    self.repo.set_deceased_outcome(record.id, None, true).await?;
                }
            }
        }
        Ok(())
    }

    /// Priority 3.5: advance every open Gregorian series across the year's
    /// free days, pausing around unavailable stretches.
    pub(crate) async fn schedule_gregorian_series(
        &self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let series_list = self.repo.fetch_open_series(user_id).await?;
        let length = self.config.gregorian_series_length;

        for series in &series_list {
            let mut completed = series.completed.min(length);

            let scan_from = match series.checkpoint {
                Some(date) => {
                    state.note(format!(
                        "Resuming Gregorian series {} from {}",
                        series.id, date
                    ));
                    date
                }
                None => series.start_date.unwrap_or_else(|| state.grid.first_day()),
            };

            let mut current = scan_from.max(state.grid.first_day());
            let mut checkpoint: Option<NaiveDate> = None;
            let mut placed_since_pause = 0u32;

            while completed < length && state.grid.contains(current) {
                if state.grid.is_free(current) {
                    let unit = completed + 1;
                    self.place_mass(
                        state,
                        NewScheduledMass {
                            user_id,
                            date: current,
                            description: format!(
                                "Gregorian ({}) #{}/{}",
                                series.donor_name, unit, length
                            ),
                            serial_number: Some(unit),
                            source: MassSource::Gregorian {
                                series: series.id,
                                batch: series.batch_id,
                            },
                        },
                    )
                    .await?;
                    state.note(format!(
                        "Gregorian mass scheduled: {} - {} #{}/{}",
                        current, series.donor_name, unit, length
                    ));
                    completed = unit;
                    placed_since_pause += 1;
                } else if placed_since_pause > 0 {
                    // First unavailable day after a placed stretch becomes
                    // the resume point.
                    checkpoint = Some(current);
                    state.note(format!(
                        "Gregorian series {} paused at {}, will resume next day",
                        series.id, current
                    ));
                    placed_since_pause = 0;
                }

                current = match current.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }

            let status = if completed >= length {
                checkpoint = None;
                SeriesStatus::Completed
            } else if completed > 0 {
                SeriesStatus::InProgress
            } else {
                SeriesStatus::Pending
            };
            self.repo
                .set_series_progress(series.id, completed, checkpoint, status)
                .await?;
        }
        Ok(())
    }

    /// Priority 4: place up to the monthly quota of personal intentions per
    /// month, on random free non-feast days.
    pub(crate) async fn schedule_personal_intentions(
        &mut self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let intentions = self.repo.fetch_personal_intentions(user_id).await?;
        let quota = self.config.personal_monthly_quota as usize;
        let year = state.grid.year();

        for month in 1..=12u32 {
            let mut pool: Vec<&PersonalIntention> =
                intentions.iter().filter(|i| i.month == month).collect();
            if pool.is_empty() {
                continue;
            }

            let mut candidates: Vec<NaiveDate> = state
                .grid
                .free_days_in_month(month)
                .into_iter()
                .filter(|d| !self.config.is_feast_day(d.month(), d.day()))
                .collect();

            pool.shuffle(&mut self.rng);
            let selected = quota.min(pool.len());

            let mut outcomes: Vec<(PersonalIntentionId, Option<NaiveDate>)> =
                Vec::with_capacity(pool.len());
            for (position, intention) in pool.iter().enumerate() {
                if position >= selected {
                    outcomes.push((intention.id, None));
                    continue;
                }
                if candidates.is_empty() {
                    state.conflict(
                        format!("{}-{:02}", year, month),
                        intention.description.clone(),
                        "No available slots for month",
                    );
                    outcomes.push((intention.id, None));
                    continue;
                }

                let pick = self.rng.gen_range(0..candidates.len());
                let date = candidates.remove(pick);
                self.place_mass(
                    state,
                    NewScheduledMass {
                        user_id,
                        date,
                        description: intention.description.clone(),
                        serial_number: None,
                        source: MassSource::Personal(intention.id),
                    },
                )
                .await?;
                state.note(format!(
                    "Personal intention scheduled: {} - {}",
                    date, intention.description
                ));
                outcomes.push((intention.id, Some(date)));
            }

            // One write per pool member; unplaced ones lose any date from a
            // prior run.
            for (id, date) in outcomes {
                self.repo.set_personal_intention_date(id, date).await?;
            }
        }
        Ok(())
    }

    /// Priority 5: fill every remaining free day from bulk batches in
    /// receipt order.
    pub(crate) async fn fill_with_bulk_batches(
        &self,
        user_id: UserId,
        state: &mut RunState,
    ) -> RepositoryResult<()> {
        let batches = self.repo.fetch_fillable_batches(user_id).await?;

        for batch in &batches {
            let mut scheduled = 0u32;
            let mut current = state.grid.first_day();
            let mut serials_exhausted = false;

            while scheduled < batch.total_count && state.grid.contains(current) {
                if state.grid.is_free(current) {
                    // A serial range running past u32::MAX stops at the cap.
                    let serial = match batch.start_index.checked_add(scheduled) {
                        Some(serial) => serial,
                        None => {
                            serials_exhausted = true;
                            break;
                        }
                    };
                    self.place_mass(
                        state,
                        NewScheduledMass {
                            user_id,
                            date: current,
                            description: format!("Bulk Batch ({}) #{}", batch.code, serial),
                            serial_number: Some(serial),
                            source: MassSource::Bulk(batch.id),
                        },
                    )
                    .await?;
                    state.note(format!(
                        "Bulk mass scheduled: {} - {} #{}",
                        current, batch.code, serial
                    ));
                    scheduled += 1;
                }

                current = match current.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }

            if serials_exhausted {
                state.note(format!(
                    "Bulk batch {} stopped, serial numbers exhausted",
                    batch.code
                ));
            } else if scheduled < batch.total_count {
                state.note(format!(
                    "Bulk batch {} short by {} masses, no free days remain",
                    batch.code,
                    batch.total_count - scheduled
                ));
            }
            self.repo
                .set_batch_scheduled_count(batch.id, scheduled)
                .await?;
        }
        Ok(())
    }
}
