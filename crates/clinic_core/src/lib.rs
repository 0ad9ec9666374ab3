//! Core logic for the clinic patient registry.
//! This crate owns the patient record rules, storage contract and prompts.

pub mod config;
pub mod db;
pub mod flow;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, DatabaseConfig, LoggingConfig, RegistryConfig};
pub use db::{ConnectionProvider, DbError};
pub use flow::{
    render_patient_table, Console, FlowError, FlowOutcome, FlowResult, PatientFlows, StdConsole,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::display_date::{
    format_display_date, parse_display_date, parse_storage_date, to_storage_date,
    DateValidationError,
};
pub use model::patient::{
    Patient, PatientDraft, PatientId, PatientSummary, PatientValidationError, RequiredField,
};
pub use repo::patient_repo::{
    ConstraintKind, PatientRepository, RepoError, RepoResult, SqlitePatientRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
