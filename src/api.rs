//! Public API surface for the scheduling engine.
//!
//! This file consolidates the DTO types returned by the scheduler and the
//! report-assembly services. All types derive Serialize/Deserialize so the
//! excluded transport layer can ship them as JSON unchanged.

pub use crate::models::entities::BatchId;
pub use crate::models::entities::BlockedDayId;
pub use crate::models::entities::Conflict;
pub use crate::models::entities::DeceasedId;
pub use crate::models::entities::FixedIntentionId;
pub use crate::models::entities::GregorianSeriesId;
pub use crate::models::entities::MassKind;
pub use crate::models::entities::PersonalIntentionId;
pub use crate::models::entities::RunStatus;
pub use crate::models::entities::ScheduledMassId;
pub use crate::models::entities::SchedulerRunId;
pub use crate::models::entities::UserId;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary returned by one `rebuild_calendar` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuildSummary {
    pub status: RunStatus,
    /// Masses placed by this run, counted from grid occupancy.
    pub total_scheduled: u32,
    /// Every placement the run could not resolve; empty on full success.
    pub conflicts: Vec<Conflict>,
    /// Timestamped decision log, in emission order.
    pub notes: Vec<String>,
}

impl RebuildSummary {
    /// Whether every intention the run attempted was placed.
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// One line of the canonical register: a mass in celebration-date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRow {
    /// Position in the register, starting at 1.
    pub serial_no: u32,
    /// Receipt date of the originating batch; absent for masses that did not
    /// come in through a batch.
    pub date_of_receipt: Option<NaiveDate>,
    /// Batch code of the originating batch, or "Unknown".
    pub from_whom: String,
    pub date_celebrated: NaiveDate,
    pub details: String,
    pub kind: MassKind,
}

/// Canonical register for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRegister {
    pub year: i32,
    pub rows: Vec<RegisterRow>,
    pub total_masses: u32,
}

/// Classification of a yearly-book line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookEntryKind {
    Blocked,
    Mass(MassKind),
}

/// One line of the yearly mass book: a blocked day or a scheduled mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub date: NaiveDate,
    pub kind: BookEntryKind,
    pub description: String,
    pub serial: Option<u32>,
    /// Auxiliary note: "No Mass" for blocked lines, the batch code for
    /// batch-sourced masses, empty otherwise.
    pub note: String,
}

/// Date-sorted merge of blocked days and scheduled masses for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyBook {
    pub year: i32,
    pub entries: Vec<BookEntry>,
    pub total_masses: u32,
    pub total_blocked: u32,
}

/// Per-record outcome line of the deceased summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeceasedOutcome {
    pub name: String,
    pub date_of_death: NaiveDate,
    pub date_celebrated: Option<NaiveDate>,
    /// Days between death and celebration, when one is scheduled.
    pub days_delay: Option<i64>,
    pub celebrated: bool,
    pub conflict: bool,
}

/// Deceased summary for one year: records celebrated within the year, plus
/// the unfiltered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeceasedSummary {
    pub year: i32,
    pub entries: Vec<DeceasedOutcome>,
    pub all_entries: Vec<DeceasedOutcome>,
}

/// A personal mass inside a monthly verification block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalEntry {
    pub date: NaiveDate,
    pub description: String,
}

/// Verification of one month's personal-intention quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPersonalCheck {
    /// Month 1-12.
    pub month: u32,
    pub count: u32,
    pub verified: bool,
    pub masses: Vec<PersonalEntry>,
}

/// Year-wide personal-intention verification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPersonalReport {
    pub year: i32,
    pub all_verified: bool,
    /// Quota times twelve months.
    pub total_expected: u32,
    pub total_actual: u32,
    pub months: Vec<MonthlyPersonalCheck>,
}
