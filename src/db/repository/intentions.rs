//! Intention-catalog repository trait.
//!
//! Read access to the entities the scheduling passes consume (blocked days,
//! fixed intentions, deceased records, personal intentions) and the explicit
//! write-back operations for the per-entity decisions a pass computes.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    BlockedDay, DeceasedId, DeceasedRecord, FixedIntention, FixedIntentionId, PersonalIntention,
    PersonalIntentionId, UserId,
};

/// Repository trait for intention catalogs and their scheduler-owned fields.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait IntentionRepository: Send + Sync {
    // ==================== Blocked Days ====================

    /// Fetch one user's blackout records with dates in `[start, end]`.
    async fn fetch_blocked_days(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<BlockedDay>>;

    // ==================== Fixed Intentions ====================

    /// Fetch all of one user's fixed intentions, in store order.
    async fn fetch_fixed_intentions(&self, user_id: UserId)
        -> RepositoryResult<Vec<FixedIntention>>;

    /// Persist the conflict flag computed for a fixed intention.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the intention does not exist
    async fn set_fixed_intention_conflict(
        &self,
        id: FixedIntentionId,
        conflict: bool,
    ) -> RepositoryResult<()>;

    // ==================== Deceased Records ====================

    /// Fetch all of one user's deceased records, in store order.
    async fn fetch_deceased_records(&self, user_id: UserId)
        -> RepositoryResult<Vec<DeceasedRecord>>;

    /// Persist a deceased record's run outcome: the scheduled date (cleared
    /// when placement failed) and the conflict flag.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the record does not exist
    async fn set_deceased_outcome(
        &self,
        id: DeceasedId,
        scheduled_date: Option<NaiveDate>,
        conflict: bool,
    ) -> RepositoryResult<()>;

    // ==================== Personal Intentions ====================

    /// Fetch all of one user's personal intentions, in store order.
    async fn fetch_personal_intentions(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<PersonalIntention>>;

    /// Persist the date chosen for a personal intention, or clear it when the
    /// intention was not placed this run.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the intention does not exist
    async fn set_personal_intention_date(
        &self,
        id: PersonalIntentionId,
        scheduled_date: Option<NaiveDate>,
    ) -> RepositoryResult<()>;
}
