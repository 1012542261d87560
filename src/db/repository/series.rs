//! Series and batch repository trait.
//!
//! Covers Gregorian series (creation at intake, progress persisted across
//! runs) and mass batches (creation at intake, consumption by the bulk
//! filler).

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    BatchId, GregorianSeries, GregorianSeriesId, MassBatch, NewBatch, NewGregorianSeries,
    SeriesStatus, UserId,
};

/// Repository trait for Gregorian series and mass batches.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    // ==================== Batches ====================

    /// Insert a batch registered at intake and return its assigned id.
    async fn insert_batch(&self, batch: &NewBatch) -> RepositoryResult<BatchId>;

    /// Fetch one user's BULK and DONOR batches in ascending receipt-date
    /// order (the bulk filler's FIFO order).
    async fn fetch_fillable_batches(&self, user_id: UserId) -> RepositoryResult<Vec<MassBatch>>;

    /// Fetch all of one user's batches regardless of kind, in store order.
    async fn list_batches(&self, user_id: UserId) -> RepositoryResult<Vec<MassBatch>>;

    /// Persist the number of units a run placed for a batch.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the batch does not exist
    async fn set_batch_scheduled_count(&self, id: BatchId, count: u32) -> RepositoryResult<()>;

    // ==================== Gregorian Series ====================

    /// Insert a Gregorian series created from a batch at intake. The series
    /// starts PENDING with a completed count of zero and no checkpoint.
    async fn insert_gregorian_series(
        &self,
        series: &NewGregorianSeries,
    ) -> RepositoryResult<GregorianSeriesId>;

    /// Fetch one user's non-COMPLETED series in creation order.
    async fn fetch_open_series(&self, user_id: UserId) -> RepositoryResult<Vec<GregorianSeries>>;

    /// Persist a series' run outcome: completed-unit count, resume
    /// checkpoint (None once completed) and status.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the series does not exist
    async fn set_series_progress(
        &self,
        id: GregorianSeriesId,
        completed: u32,
        checkpoint: Option<NaiveDate>,
        status: SeriesStatus,
    ) -> RepositoryResult<()>;
}
