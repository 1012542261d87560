//! Scheduled-mass repository trait.
//!
//! This trait covers the rows a scheduler run produces: wiping the previous
//! run's output for a year, inserting new placements, and reading them back
//! for reports and verification.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{NewScheduledMass, ScheduledMass, ScheduledMassId, UserId};

/// Repository trait for scheduled-mass rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait MassRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backend is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is reachable
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Mass Operations ====================

    /// Delete every scheduled mass of one user whose date falls in
    /// `[start, end]`. Returns the number of rows removed.
    ///
    /// A rebuild calls this first: the new run fully supersedes the old one.
    async fn delete_masses_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<u64>;

    /// Insert one scheduled mass and return its assigned id.
    async fn insert_mass(&self, mass: &NewScheduledMass) -> RepositoryResult<ScheduledMassId>;

    /// Fetch one user's scheduled masses with dates in `[start, end]`,
    /// ordered by date ascending.
    async fn fetch_masses_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduledMass>>;
}
