//! Patient repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/find/update/delete over the `Pacientes` table.
//! - Keep SQL and storage error classification inside the persistence boundary.
//!
//! # Invariants
//! - Each operation opens its own connection and releases it before returning.
//! - Writes run in a transaction: commit on success, rollback on any error.
//! - Writes call `PatientDraft::validate()` before SQL mutations.
//! - `national_id` uniqueness and foreign-key dependencies are enforced by
//!   storage and surface as `RepoError::Constraint`.

use crate::db::{ConnectionProvider, DbError};
use crate::model::patient::{
    Patient, PatientDraft, PatientId, PatientSummary, PatientValidationError,
};
use log::{debug, info, warn};
use rusqlite::{ffi, params, ErrorCode, Row};
use std::fmt::{Display, Formatter};
use std::time::Instant;
use thiserror::Error;

const SUMMARY_SELECT_SQL: &str = "SELECT
    paciente_id,
    nome,
    cpf,
    data_nascimento,
    telefone
FROM Pacientes";

const PATIENT_SELECT_SQL: &str = "SELECT
    paciente_id,
    nome,
    cpf,
    data_nascimento,
    telefone,
    endereco
FROM Pacientes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Which storage constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Other,
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::NotNull => "not null",
            Self::Other => "constraint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Validation(#[from] PatientValidationError),
    /// The database could not be opened or prepared.
    #[error("database unavailable: {0}")]
    Connection(#[source] DbError),
    /// Storage refused the write; `message` is the raw storage message.
    #[error("{kind} violation: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },
    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),
    #[error("invalid persisted patient data: {0}")]
    InvalidData(String),
}

impl RepoError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Connection(_) => "connection",
            Self::Constraint { .. } => "constraint",
            Self::Storage(_) => "storage",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, message) = &value {
            if err.code == ErrorCode::ConstraintViolation {
                let kind = match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        ConstraintKind::Unique
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                    ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
                    _ => ConstraintKind::Other,
                };
                return Self::Constraint {
                    kind,
                    message: message.clone().unwrap_or_else(|| err.to_string()),
                };
            }
        }
        Self::Storage(value)
    }
}

/// Record store for patients.
pub trait PatientRepository {
    /// Inserts a new patient and returns the storage-assigned id.
    fn create(&self, draft: &PatientDraft) -> RepoResult<PatientId>;
    /// Lists every patient in storage order, without addresses.
    fn list_all(&self) -> RepoResult<Vec<PatientSummary>>;
    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>>;
    /// Rewrites every mutable field. `Ok(false)` means no row had this id.
    fn update(&self, id: PatientId, draft: &PatientDraft) -> RepoResult<bool>;
    /// Removes one patient. `Ok(false)` means no row had this id.
    fn delete(&self, id: PatientId) -> RepoResult<bool>;
}

/// SQLite-backed patient repository, one connection per call.
pub struct SqlitePatientRepository {
    provider: ConnectionProvider,
}

impl SqlitePatientRepository {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    fn write<T>(
        &self,
        op: &'static str,
        body: impl FnOnce(&rusqlite::Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result: RepoResult<T> = (|| {
            let mut conn = self.provider.connect().map_err(RepoError::Connection)?;
            let tx = conn.transaction()?;
            // Dropping an uncommitted transaction rolls it back.
            let value = body(&tx)?;
            tx.commit()?;
            Ok(value)
        })();
        log_outcome(op, started_at, &result);
        result
    }

    fn read<T>(
        &self,
        op: &'static str,
        body: impl FnOnce(&rusqlite::Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = self
            .provider
            .connect()
            .map_err(RepoError::Connection)
            .and_then(|conn| body(&*conn));
        log_outcome(op, started_at, &result);
        result
    }
}

impl PatientRepository for SqlitePatientRepository {
    fn create(&self, draft: &PatientDraft) -> RepoResult<PatientId> {
        draft.validate()?;

        self.write("patient_create", |tx| {
            tx.execute(
                "INSERT INTO Pacientes (
                    nome,
                    cpf,
                    data_nascimento,
                    telefone,
                    endereco
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    draft.full_name.as_str(),
                    draft.national_id.as_str(),
                    draft.birth_date,
                    draft.phone.as_str(),
                    draft.address.as_deref(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            info!("event=patient_create module=repo status=ok patient_id={id}");
            Ok(id)
        })
    }

    fn list_all(&self) -> RepoResult<Vec<PatientSummary>> {
        self.read("patient_list", |conn| {
            let mut stmt = conn.prepare(&format!("{SUMMARY_SELECT_SQL};"))?;
            let mut rows = stmt.query([])?;
            let mut patients = Vec::new();
            while let Some(row) = rows.next()? {
                patients.push(parse_summary_row(row)?);
            }
            debug!(
                "event=patient_list module=repo status=ok rows={}",
                patients.len()
            );
            Ok(patients)
        })
    }

    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        self.read("patient_find", |conn| {
            let mut stmt = conn.prepare(&format!("{PATIENT_SELECT_SQL} WHERE paciente_id = ?1;"))?;
            let mut rows = stmt.query([id])?;
            match rows.next()? {
                Some(row) => Ok(Some(parse_patient_row(row)?)),
                None => Ok(None),
            }
        })
    }

    fn update(&self, id: PatientId, draft: &PatientDraft) -> RepoResult<bool> {
        draft.validate()?;

        self.write("patient_update", |tx| {
            let changed = tx.execute(
                "UPDATE Pacientes
                 SET
                    nome = ?1,
                    cpf = ?2,
                    data_nascimento = ?3,
                    telefone = ?4,
                    endereco = ?5
                 WHERE paciente_id = ?6;",
                params![
                    draft.full_name.as_str(),
                    draft.national_id.as_str(),
                    draft.birth_date,
                    draft.phone.as_str(),
                    draft.address.as_deref(),
                    id,
                ],
            )?;
            if changed == 0 {
                warn!("event=patient_update module=repo status=not_found patient_id={id}");
            }
            Ok(changed > 0)
        })
    }

    fn delete(&self, id: PatientId) -> RepoResult<bool> {
        self.write("patient_delete", |tx| {
            let changed = tx.execute("DELETE FROM Pacientes WHERE paciente_id = ?1;", [id])?;
            if changed == 0 {
                warn!("event=patient_delete module=repo status=not_found patient_id={id}");
            }
            Ok(changed > 0)
        })
    }
}

fn log_outcome<T>(op: &'static str, started_at: Instant, result: &RepoResult<T>) {
    match result {
        Ok(_) => debug!(
            "event={op} module=repo status=done duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={op} module=repo status=error error_code={} duration_ms={}",
            err.code(),
            started_at.elapsed().as_millis()
        ),
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<PatientSummary> {
    Ok(PatientSummary {
        id: row.get("paciente_id")?,
        full_name: row.get("nome")?,
        national_id: row.get("cpf")?,
        birth_date: parse_birth_date(row)?,
        phone: row.get("telefone")?,
    })
}

fn parse_patient_row(row: &Row<'_>) -> RepoResult<Patient> {
    Ok(Patient {
        id: row.get("paciente_id")?,
        full_name: row.get("nome")?,
        national_id: row.get("cpf")?,
        birth_date: parse_birth_date(row)?,
        phone: row.get("telefone")?,
        address: row.get("endereco")?,
    })
}

fn parse_birth_date(row: &Row<'_>) -> RepoResult<chrono::NaiveDate> {
    row.get("data_nascimento").map_err(|err| match err {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            RepoError::InvalidData(format!(
                "invalid date in Pacientes.data_nascimento: {err}"
            ))
        }
        other => RepoError::from(other),
    })
}
