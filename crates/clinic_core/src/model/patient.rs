//! Patient records.
//!
//! # Invariants
//! - `full_name`, `national_id` and `phone` are never blank on a stored row.
//! - `address` is either absent or non-blank; empty input means absent.
//! - `national_id` uniqueness is left to storage; nothing here checks it.

use chrono::NaiveDate;
use thiserror::Error;

/// Storage-assigned patient identifier.
pub type PatientId = i64;

/// Required text field that was blank on a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    FullName,
    NationalId,
    Phone,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "full name",
            Self::NationalId => "national id",
            Self::Phone => "phone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatientValidationError {
    #[error("missing required fields: {}", labels(.0))]
    MissingRequired(Vec<RequiredField>),
}

fn labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every mutable patient field, as written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDraft {
    pub full_name: String,
    /// CPF-style national identifier, unique across patients.
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: Option<String>,
}

impl PatientDraft {
    /// Builds a draft from raw input, trimming text and mapping a blank
    /// address to `None`.
    pub fn from_input(
        full_name: &str,
        national_id: &str,
        birth_date: NaiveDate,
        phone: &str,
        address: &str,
    ) -> Self {
        Self {
            full_name: full_name.trim().to_string(),
            national_id: national_id.trim().to_string(),
            birth_date,
            phone: phone.trim().to_string(),
            address: non_blank(address),
        }
    }

    /// Checks that every required text field is non-blank.
    pub fn validate(&self) -> Result<(), PatientValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PatientValidationError::MissingRequired(missing))
        }
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        [
            (RequiredField::FullName, &self.full_name),
            (RequiredField::NationalId, &self.national_id),
            (RequiredField::Phone, &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Full patient projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: Option<String>,
}

impl Patient {
    pub fn from_draft(id: PatientId, draft: PatientDraft) -> Self {
        Self {
            id,
            full_name: draft.full_name,
            national_id: draft.national_id,
            birth_date: draft.birth_date,
            phone: draft.phone,
            address: draft.address,
        }
    }

    /// Copies the mutable fields into a draft for editing.
    pub fn to_draft(&self) -> PatientDraft {
        PatientDraft {
            full_name: self.full_name.clone(),
            national_id: self.national_id.clone(),
            birth_date: self.birth_date,
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

/// List projection; the address is not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub id: PatientId,
    pub full_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub phone: String,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
            national_id: patient.national_id.clone(),
            birth_date: patient.birth_date,
            phone: patient.phone.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 3, 15).expect("valid date")
    }

    #[test]
    fn from_input_trims_and_drops_blank_address() {
        let draft = PatientDraft::from_input(
            "  Maria Silva ",
            "123.456.789-00",
            birth_date(),
            " (11) 91234-5678",
            "   ",
        );
        assert_eq!(draft.full_name, "Maria Silva");
        assert_eq!(draft.phone, "(11) 91234-5678");
        assert_eq!(draft.address, None);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn validate_lists_every_blank_required_field() {
        let draft = PatientDraft::from_input(" ", "123", birth_date(), "", "Rua A, 10");
        let err = draft.validate().expect_err("blank required fields");
        assert_eq!(
            err,
            PatientValidationError::MissingRequired(vec![
                RequiredField::FullName,
                RequiredField::Phone
            ])
        );
        assert_eq!(err.to_string(), "missing required fields: full name, phone");
    }

    #[test]
    fn draft_round_trips_through_patient() {
        let draft = PatientDraft::from_input("Ana", "1", birth_date(), "555", "Rua B");
        let patient = Patient::from_draft(7, draft.clone());
        assert_eq!(patient.to_draft(), draft);
        assert_eq!(PatientSummary::from(&patient).id, 7);
    }
}
