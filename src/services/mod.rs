//! Service layer for intake and report assembly.
//!
//! This module contains the operations that sit beside the scheduler: batch
//! intake (which feeds the passes their material) and the report-assembly
//! functions that read a finished year back out of the repository.

pub mod intake;

pub mod register;


pub use intake::{parse_batch_json, parse_legacy_fixed_label, register_batch, BatchIntake};
pub use register::{canonical_register, deceased_summary, monthly_personal_check, yearly_book};
