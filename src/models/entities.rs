//! Domain entities for mass-intention scheduling.
//!
//! These are the records the scheduler reads from and writes back to the
//! repository: intention catalogs (fixed, deceased, Gregorian, personal,
//! batch), blackout days, the scheduled masses produced by a run, and the
//! per-run audit row. All scheduling dates are day-granularity
//! [`NaiveDate`] values; there is no time-of-day component anywhere in the
//! model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id;

define_id!(UserId, "Identifier of the user owning a set of calendar entities.");
define_id!(ScheduledMassId, "Identifier of a scheduled mass row.");
define_id!(BlockedDayId, "Identifier of a blackout-day record.");
define_id!(FixedIntentionId, "Identifier of a fixed intention.");
define_id!(DeceasedId, "Identifier of a deceased record.");
define_id!(GregorianSeriesId, "Identifier of a Gregorian series.");
define_id!(PersonalIntentionId, "Identifier of a personal intention.");
define_id!(BatchId, "Identifier of a mass batch.");
define_id!(SchedulerRunId, "Identifier of a persisted scheduler run.");

/// The scheduling pass a mass originates from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MassKind {
    Fixed,
    Deceased,
    Gregorian,
    Personal,
    Bulk,
}

impl MassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MassKind::Fixed => "FIXED",
            MassKind::Deceased => "DECEASED",
            MassKind::Gregorian => "GREGORIAN",
            MassKind::Personal => "PERSONAL",
            MassKind::Bulk => "BULK",
        }
    }
}

impl std::fmt::Display for MassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a scheduled mass back to the entity that requested it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassSource {
    Fixed(FixedIntentionId),
    Deceased(DeceasedId),
    Gregorian {
        series: GregorianSeriesId,
        batch: BatchId,
    },
    Personal(PersonalIntentionId),
    Bulk(BatchId),
}

impl MassSource {
    pub fn kind(&self) -> MassKind {
        match self {
            MassSource::Fixed(_) => MassKind::Fixed,
            MassSource::Deceased(_) => MassKind::Deceased,
            MassSource::Gregorian { .. } => MassKind::Gregorian,
            MassSource::Personal(_) => MassKind::Personal,
            MassSource::Bulk(_) => MassKind::Bulk,
        }
    }
}

/// One intention placed on one calendar day.
///
/// Created only by scheduling passes, never mutated within a run, and fully
/// superseded on the next rebuild for the same user and year (the run deletes
/// all prior rows in range before placing anything).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMass {
    pub id: ScheduledMassId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub description: String,
    /// Sequential number within a series or batch, when the pass issues one.
    pub serial_number: Option<u32>,
    pub source: MassSource,
}

impl ScheduledMass {
    pub fn kind(&self) -> MassKind {
        self.source.kind()
    }
}

/// Insert payload for a scheduled mass; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduledMass {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub description: String,
    pub serial_number: Option<u32>,
    pub source: MassSource,
}

/// A day on which no mass may be placed. Read-only input to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedDay {
    pub id: BlockedDayId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub reason: String,
    /// Free-form reason category, e.g. "HOLIDAY" or "TRAVEL".
    pub category: String,
}

/// Target-date rule for a fixed intention.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedTarget {
    /// Recurs annually on an explicit month and day-of-month.
    MonthDay { month: u32, day: u32 },
    /// One-shot offset (1-366) from the year's first day.
    DayOfYear(u32),
}

/// A recurring or one-shot intention tied to a specific calendar day
/// (birthdays, anniversaries, feast commemorations).
///
/// The scheduler mutates only `conflict_flag`; the flag is recomputed and
/// persisted for every intention on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedIntention {
    pub id: FixedIntentionId,
    pub user_id: UserId,
    pub target: FixedTarget,
    /// Category label, e.g. "Anniversary"; used as the description fallback.
    pub category: String,
    pub description: String,
    pub conflict_flag: bool,
}

impl FixedIntention {
    /// Description carried by the scheduled mass.
    pub fn display_description(&self) -> String {
        if self.description.is_empty() {
            format!("Fixed Intention: {}", self.category)
        } else {
            self.description.clone()
        }
    }
}

/// A deceased person owed one mass at (date of death + offset), or on a
/// manually chosen override date. The scheduler writes back the resulting
/// scheduled date and conflict flag each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeceasedRecord {
    pub id: DeceasedId,
    pub user_id: UserId,
    pub name: String,
    pub date_of_death: NaiveDate,
    pub schedule_override: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub conflict_flag: bool,
}

/// Lifecycle of a Gregorian series across runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesStatus {
    Pending,
    InProgress,
    Completed,
}

impl SeriesStatus {
    /// Whether the series still takes placements.
    pub fn is_open(&self) -> bool {
        !matches!(self, SeriesStatus::Completed)
    }
}

/// A fixed-length consecutive sequence of masses for one beneficiary.
///
/// `completed` counts the units already placed across runs; `checkpoint`
/// remembers where scanning was last interrupted so a later run resumes
/// there instead of the original start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GregorianSeries {
    pub id: GregorianSeriesId,
    pub user_id: UserId,
    pub donor_name: String,
    pub batch_id: BatchId,
    pub start_date: Option<NaiveDate>,
    pub completed: u32,
    pub checkpoint: Option<NaiveDate>,
    pub status: SeriesStatus,
}

/// A flexible intention owned by a month; up to the monthly quota of these
/// are placed on randomly chosen free days of that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalIntention {
    pub id: PersonalIntentionId,
    pub user_id: UserId,
    /// Owning month, 1-12.
    pub month: u32,
    pub description: String,
    pub scheduled_date: Option<NaiveDate>,
}

/// What a batch of intentions is for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchKind {
    Gregorian,
    Bulk,
    Donor,
}

/// A received pool of intentions: either the origin of a Gregorian series or
/// interchangeable bulk/donor intentions filled into remaining free days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassBatch {
    pub id: BatchId,
    pub user_id: UserId,
    /// External register code, e.g. "B-2026-014".
    pub code: String,
    pub kind: BatchKind,
    pub total_count: u32,
    /// First serial number to issue for this batch.
    pub start_index: u32,
    /// Units placed by the most recent run.
    pub scheduled_count: u32,
    pub date_received: NaiveDate,
}

impl MassBatch {
    /// Whether the bulk-batch filler consumes this batch directly.
    pub fn is_fillable(&self) -> bool {
        matches!(self.kind, BatchKind::Bulk | BatchKind::Donor)
    }
}

/// Insert payload for a batch registered at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBatch {
    pub user_id: UserId,
    pub code: String,
    pub kind: BatchKind,
    pub total_count: u32,
    pub start_index: u32,
    pub date_received: NaiveDate,
    /// Beneficiary name; required for Gregorian batches.
    pub donor_name: String,
}

/// Insert payload for a Gregorian series created from a batch at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGregorianSeries {
    pub user_id: UserId,
    pub donor_name: String,
    pub batch_id: BatchId,
    pub start_date: Option<NaiveDate>,
}

/// Outcome classification of one scheduler invocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    PartialConflict,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::PartialConflict => "PARTIAL_CONFLICT",
            RunStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intention the run could not place, recorded rather than dropped.
///
/// `date` is either a day key (`YYYY-MM-DD`) or, for month-scoped conflicts,
/// a period key (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub date: String,
    pub intention: String,
    pub reason: String,
}

impl Conflict {
    pub fn new(
        date: impl Into<String>,
        intention: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            intention: intention.into(),
            reason: reason.into(),
        }
    }
}

/// Audit record of one scheduler invocation: one row per run, never read
/// back by the scheduler itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerRun {
    pub id: SchedulerRunId,
    pub user_id: UserId,
    pub year: i32,
    pub status: RunStatus,
    /// JSON-serialized list of [`Conflict`] records.
    pub conflicts_json: String,
    /// JSON-serialized list of timestamped note strings.
    pub notes_json: String,
    pub total_scheduled: u32,
    pub total_conflicts: u32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a scheduler run audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedulerRun {
    pub user_id: UserId,
    pub year: i32,
    pub status: RunStatus,
    pub conflicts_json: String,
    pub notes_json: String,
    pub total_scheduled: u32,
    pub total_conflicts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_source_maps_to_kind() {
        assert_eq!(MassSource::Fixed(FixedIntentionId(1)).kind(), MassKind::Fixed);
        assert_eq!(MassSource::Deceased(DeceasedId(2)).kind(), MassKind::Deceased);
        assert_eq!(
            MassSource::Gregorian {
                series: GregorianSeriesId(3),
                batch: BatchId(4)
            }
            .kind(),
            MassKind::Gregorian
        );
        assert_eq!(
            MassSource::Personal(PersonalIntentionId(5)).kind(),
            MassKind::Personal
        );
        assert_eq!(MassSource::Bulk(BatchId(6)).kind(), MassKind::Bulk);
    }

    #[test]
    fn only_bulk_and_donor_batches_are_fillable() {
        let mut batch = MassBatch {
            id: BatchId(1),
            user_id: UserId(1),
            code: "B-1".to_string(),
            kind: BatchKind::Bulk,
            total_count: 10,
            start_index: 1,
            scheduled_count: 0,
            date_received: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        };
        assert!(batch.is_fillable());
        batch.kind = BatchKind::Donor;
        assert!(batch.is_fillable());
        batch.kind = BatchKind::Gregorian;
        assert!(!batch.is_fillable());
    }

    #[test]
    fn fixed_intention_falls_back_to_category_description() {
        let intention = FixedIntention {
            id: FixedIntentionId(1),
            user_id: UserId(1),
            target: FixedTarget::DayOfYear(10),
            category: "Anniversary".to_string(),
            description: String::new(),
            conflict_flag: false,
        };
        assert_eq!(intention.display_description(), "Fixed Intention: Anniversary");
    }

    #[test]
    fn run_status_display_matches_wire_form() {
        assert_eq!(RunStatus::PartialConflict.to_string(), "PARTIAL_CONFLICT");
        assert_eq!(RunStatus::Success.to_string(), "SUCCESS");
        assert_eq!(RunStatus::Error.to_string(), "ERROR");
    }
}
