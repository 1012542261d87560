//! # Mass Intention Scheduler
//!
//! Calendar engine for parish mass-intention bookkeeping.
//!
//! This crate schedules a year of mass intentions onto a one-mass-per-day
//! calendar. A rebuild wipes the year and replays every intention source in
//! fixed priority order: blackout days first, then date-bound fixed
//! intentions, deceased memorials, 30-day Gregorian series, randomized
//! monthly personal intentions and finally bulk batches over whatever days
//! remain. Unplaceable intentions become recorded conflicts rather than
//! failures, and every run leaves an audit row behind.
//!
//! ## Features
//!
//! - **Priority passes**: deterministic precedence between intention kinds
//! - **Gregorian continuity**: consecutive-day series that pause on
//!   obstacles and resume across runs without renumbering
//! - **Conflict reporting**: per-intention records of what could not be
//!   placed and why
//! - **Audit trail**: timestamped notes and totals persisted per run
//! - **Repository pattern**: storage behind async traits, with an
//!   in-memory implementation for tests and development
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) returned to callers
//! - [`config`]: scheduling constants and TOML configuration loading
//! - [`models`]: domain entities shared by every layer
//! - [`db`]: repository traits, the in-memory store and the factory
//! - [`scheduler`]: the rebuild orchestrator and its passes
//! - [`services`]: batch intake and report assembly

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod config;

pub mod db;
pub mod models;

pub mod scheduler;

pub mod services;

pub use api::RebuildSummary;
pub use config::SchedulerConfig;
pub use db::repositories::LocalRepository;
pub use scheduler::MassScheduler;
