//! Report data assembly.
//!
//! Builds the parish register views out of stored scheduling output: the
//! canonical register, the yearly mass book, the deceased summary and the
//! monthly personal-intention verification. These functions return plain
//! data; rendering belongs to the caller.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use log::info;

use crate::api::{
    BookEntry, BookEntryKind, CanonicalRegister, DeceasedOutcome, DeceasedSummary,
    MonthlyPersonalCheck, MonthlyPersonalReport, PersonalEntry, RegisterRow, YearlyBook,
};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{BatchId, MassBatch, MassKind, MassSource, ScheduledMass, UserId};

// ==================== Shared Helpers ====================

fn year_bounds(year: i32) -> RepositoryResult<(NaiveDate, NaiveDate)> {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(RepositoryError::validation(format!(
            "Year {} has no calendar days",
            year
        ))),
    }
}

async fn batch_index<R: FullRepository>(
    repo: &R,
    user_id: UserId,
) -> RepositoryResult<HashMap<BatchId, MassBatch>> {
    let batches = repo.list_batches(user_id).await?;
    Ok(batches.into_iter().map(|b| (b.id, b)).collect())
}

/// The batch a mass was drawn from, when it came in through one.
fn source_batch(mass: &ScheduledMass) -> Option<BatchId> {
    match mass.source {
        MassSource::Gregorian { batch, .. } => Some(batch),
        MassSource::Bulk(batch) => Some(batch),
        _ => None,
    }
}

// ==================== Canonical Register ====================

/// Assemble the canonical register: one row per scheduled mass of the year
/// in celebration-date order, numbered from 1.
///
/// Rows resolve their origin through the batch table: batch-sourced masses
/// carry the batch code and receipt date, everything else is listed as
/// "Unknown" provenance.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the calendar
/// * `year` - Register year
pub async fn canonical_register<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    year: i32,
) -> RepositoryResult<CanonicalRegister> {
    info!(
        "Assembling canonical register for user {} in year {}",
        user_id, year
    );
    let (start, end) = year_bounds(year)?;
    let masses = repo.fetch_masses_in_range(user_id, start, end).await?;
    let batches = batch_index(repo, user_id).await?;

    let rows: Vec<RegisterRow> = masses
        .iter()
        .enumerate()
        .map(|(index, mass)| {
            let batch = source_batch(mass).and_then(|id| batches.get(&id));
            RegisterRow {
                serial_no: index as u32 + 1,
                date_of_receipt: batch.map(|b| b.date_received),
                from_whom: batch
                    .map(|b| b.code.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                date_celebrated: mass.date,
                details: if mass.description.is_empty() {
                    "Mass".to_string()
                } else {
                    mass.description.clone()
                },
                kind: mass.kind(),
            }
        })
        .collect();

    Ok(CanonicalRegister {
        year,
        total_masses: rows.len() as u32,
        rows,
    })
}

// ==================== Yearly Mass Book ====================

/// Assemble the yearly mass book: blocked days and scheduled masses merged
/// into one date-sorted list.
///
/// Blocked lines carry the blackout reason and a "No Mass" note; mass lines
/// carry the batch code as their note when the mass came from a batch. The
/// sort is stable, so a blocked line stays ahead of any mass line sharing
/// its date.
pub async fn yearly_book<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    year: i32,
) -> RepositoryResult<YearlyBook> {
    info!(
        "Assembling yearly mass book for user {} in year {}",
        user_id, year
    );
    let (start, end) = year_bounds(year)?;
    let masses = repo.fetch_masses_in_range(user_id, start, end).await?;
    let blocked = repo.fetch_blocked_days(user_id, start, end).await?;
    let batches = batch_index(repo, user_id).await?;

    let mut entries = Vec::with_capacity(masses.len() + blocked.len());
    for day in &blocked {
        entries.push(BookEntry {
            date: day.date,
            kind: BookEntryKind::Blocked,
            description: day.reason.clone(),
            serial: None,
            note: "No Mass".to_string(),
        });
    }
    for mass in &masses {
        let code = source_batch(mass)
            .and_then(|id| batches.get(&id))
            .map(|b| b.code.as_str());
        entries.push(BookEntry {
            date: mass.date,
            kind: BookEntryKind::Mass(mass.kind()),
            description: if mass.description.is_empty() {
                mass.kind().to_string()
            } else {
                mass.description.clone()
            },
            serial: mass.serial_number,
            note: code.map(|c| format!("Batch: {}", c)).unwrap_or_default(),
        });
    }
    entries.sort_by_key(|entry| entry.date);

    Ok(YearlyBook {
        year,
        total_masses: masses.len() as u32,
        total_blocked: blocked.len() as u32,
        entries,
    })
}

// ==================== Deceased Summary ====================

/// Assemble the deceased summary, in death-date order.
///
/// `entries` holds the records celebrated within the requested year;
/// `all_entries` holds every record, celebrated or not, so pending and
/// conflicted ones stay visible.
pub async fn deceased_summary<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    year: i32,
) -> RepositoryResult<DeceasedSummary> {
    info!(
        "Assembling deceased summary for user {} in year {}",
        user_id, year
    );
    let mut records = repo.fetch_deceased_records(user_id).await?;
    records.sort_by_key(|record| record.date_of_death);

    let all_entries: Vec<DeceasedOutcome> = records
        .iter()
        .map(|record| DeceasedOutcome {
            name: record.name.clone(),
            date_of_death: record.date_of_death,
            date_celebrated: record.scheduled_date,
            days_delay: record
                .scheduled_date
                .map(|date| (date - record.date_of_death).num_days()),
            celebrated: record.scheduled_date.is_some(),
            conflict: record.conflict_flag,
        })
        .collect();

    let entries = all_entries
        .iter()
        .filter(|outcome| outcome.date_celebrated.map(|d| d.year()) == Some(year))
        .cloned()
        .collect();

    Ok(DeceasedSummary {
        year,
        entries,
        all_entries,
    })
}

// ==================== Monthly Personal Verification ====================

/// Verify the personal-intention quota month by month.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `user_id` - Owner of the calendar
/// * `year` - Year to verify
/// * `quota` - Expected personal masses per month
///
/// # Returns
/// * `Ok(MonthlyPersonalReport)` with one check per month; a month is
///   verified when its count equals the quota exactly
pub async fn monthly_personal_check<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    year: i32,
    quota: u32,
) -> RepositoryResult<MonthlyPersonalReport> {
    info!(
        "Verifying monthly personal intentions for user {} in year {}",
        user_id, year
    );
    let (start, end) = year_bounds(year)?;
    let masses = repo.fetch_masses_in_range(user_id, start, end).await?;

    let mut months = Vec::with_capacity(12);
    for month in 1..=12u32 {
        let month_masses: Vec<PersonalEntry> = masses
            .iter()
            .filter(|mass| mass.kind() == MassKind::Personal && mass.date.month() == month)
            .map(|mass| PersonalEntry {
                date: mass.date,
                description: mass.description.clone(),
            })
            .collect();
        let count = month_masses.len() as u32;
        months.push(MonthlyPersonalCheck {
            month,
            count,
            verified: count == quota,
            masses: month_masses,
        });
    }

    let total_actual = months.iter().map(|check| check.count).sum();
    Ok(MonthlyPersonalReport {
        year,
        all_verified: months.iter().all(|check| check.verified),
        total_expected: quota * 12,
        total_actual,
        months,
    })
}
