//! Audit-trail repository trait.
//!
//! One row is written per scheduler invocation; the rows are never read back
//! by the scheduler itself, only by hosts inspecting run history.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewSchedulerRun, SchedulerRun, SchedulerRunId, UserId};

/// Repository trait for scheduler-run audit rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Insert one run record and return its assigned id.
    async fn insert_run(&self, run: &NewSchedulerRun) -> RepositoryResult<SchedulerRunId>;

    /// Fetch the most recent run for a user, if any.
    async fn latest_run(&self, user_id: UserId) -> RepositoryResult<Option<SchedulerRun>>;

    /// Fetch all runs for a user, newest first.
    async fn list_runs(&self, user_id: UserId) -> RepositoryResult<Vec<SchedulerRun>>;
}
