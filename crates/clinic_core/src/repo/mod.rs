//! Record store layer.
//!
//! # Responsibility
//! - Define the patient persistence contract used by interaction flows.
//! - Isolate SQLite query details from prompting and validation.
//!
//! # Invariants
//! - Repository APIs separate "not found" (`Ok(None)` / `Ok(false)`) from
//!   connection and storage failures.

pub mod patient_repo;
