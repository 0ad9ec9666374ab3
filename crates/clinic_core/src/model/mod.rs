//! Patient domain model.
//!
//! # Responsibility
//! - Define the typed records exchanged between flows and the record store.
//! - Translate dates between the display form and the storage form.
//!
//! # Invariants
//! - `PatientId` is assigned by storage and never reused.
//! - Dates are held as `NaiveDate`; text forms exist only at the boundaries.

pub mod display_date;
pub mod patient;
