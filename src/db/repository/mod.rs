//! Repository trait definitions for store operations.
//!
//! This module provides a collection of focused repository traits that
//! abstract the persistence layer. By splitting responsibilities across
//! multiple traits, implementations stay focused and testable, and the
//! scheduler can be exercised against an in-memory backend.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`masses`]: Scheduled-mass rows produced by a run
//! - [`intentions`]: Intention catalogs and their scheduler-owned fields
//! - [`series`]: Gregorian series and mass batches
//! - [`audit`]: Per-run audit rows
//!
//! # Trait Composition
//!
//! A complete repository implementation typically implements all traits:
//!
//! ```ignore
//! impl MassRepository for MyRepo { ... }
//! impl IntentionRepository for MyRepo { ... }
//! impl SeriesRepository for MyRepo { ... }
//! impl AuditRepository for MyRepo { ... }
//! ```
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     repo.delete_masses_in_range(user, start, end).await?;
//!     repo.insert_run(&run).await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod error;
pub mod intentions;
pub mod masses;
pub mod series;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use audit::AuditRepository;
pub use intentions::IntentionRepository;
pub use masses::MassRepository;
pub use series::SeriesRepository;

/// Composite trait bound for a complete repository implementation.
///
/// This trait is automatically implemented for any type that implements
/// all four repository traits. Use this as a convenient bound when you
/// need access to all repository operations.
///
/// # Example
///
/// ```ignore
/// async fn rebuild<R: FullRepository>(repo: &R, user: UserId) -> RepositoryResult<()> {
///     let blocked = repo.fetch_blocked_days(user, start, end).await?;
///     repo.insert_run(&run).await?;
///     Ok(())
/// }
/// ```
pub trait FullRepository:
    MassRepository + IntentionRepository + SeriesRepository + AuditRepository
{
}

// Blanket implementation: any type implementing all four traits automatically implements FullRepository
impl<T> FullRepository for T where
    T: MassRepository + IntentionRepository + SeriesRepository + AuditRepository
{
}
