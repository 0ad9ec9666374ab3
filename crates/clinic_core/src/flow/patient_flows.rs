use super::console::Console;
use super::table::render_patient_table;
use crate::model::display_date::{format_display_date, parse_display_date};
use crate::model::patient::{
    Patient, PatientDraft, PatientId, PatientValidationError, RequiredField,
};
use crate::repo::patient_repo::{PatientRepository, RepoError};
use chrono::NaiveDate;
use log::warn;
use std::io;
use thiserror::Error;

/// Answer that confirms a removal, compared case-insensitively.
pub const CONFIRM_TOKEN: &str = "Y";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;

/// What a flow ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Created(PatientId),
    Listed(usize),
    Updated(PatientId),
    Removed(PatientId),
    NotFound(PatientId),
    InvalidId,
    MissingRequired(Vec<RequiredField>),
    Cancelled,
    /// The store reported an error; a diagnostic was printed.
    Failed,
}

/// Create/list/modify/remove use-cases over a patient repository.
pub struct PatientFlows<R: PatientRepository> {
    repo: R,
}

impl<R: PatientRepository> PatientFlows<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Collects a new patient and stores it.
    ///
    /// The birth date is re-prompted until it parses. A blank address is
    /// stored as absent. Blank name, national id or phone aborts before any
    /// store call.
    pub fn create<C: Console>(&self, console: &mut C) -> FlowResult<FlowOutcome> {
        console.write_line("")?;
        console.write_line("--- Register New Patient ---")?;

        let full_name = console.read_line("Full name: ")?;
        let national_id = console.read_line("National ID (CPF, digits or punctuation): ")?;
        let birth_date = prompt_date(console, "Birth date (DD/MM/YYYY): ", None)?;
        let phone = console.read_line("Phone (required): ")?;
        let address = console.read_line("Address (optional, leave empty to skip): ")?;

        let draft =
            PatientDraft::from_input(&full_name, &national_id, birth_date, &phone, &address);
        if let Err(PatientValidationError::MissingRequired(fields)) = draft.validate() {
            console.write_line(
                "Please fill in all required fields (full name, national id, phone).",
            )?;
            return Ok(FlowOutcome::MissingRequired(fields));
        }

        match self.repo.create(&draft) {
            Ok(id) => {
                console.write_line(&format!(
                    "Patient '{}' registered successfully. ID: {id}",
                    draft.full_name
                ))?;
                Ok(FlowOutcome::Created(id))
            }
            Err(err) => {
                report_failure(console, "register patient", &err)?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    /// Prints every patient as a fixed-width table.
    pub fn list<C: Console>(&self, console: &mut C) -> FlowResult<FlowOutcome> {
        console.write_line("")?;
        console.write_line("--- Registered Patients ---")?;

        let patients = match self.repo.list_all() {
            Ok(patients) => patients,
            Err(err) => {
                report_failure(console, "list patients", &err)?;
                return Ok(FlowOutcome::Failed);
            }
        };

        if patients.is_empty() {
            console.write_line("No patients registered.")?;
            return Ok(FlowOutcome::Listed(0));
        }

        for line in render_patient_table(&patients) {
            console.write_line(&line)?;
        }
        Ok(FlowOutcome::Listed(patients.len()))
    }

    /// Edits an existing patient; an empty answer keeps the current value.
    pub fn modify<C: Console>(&self, console: &mut C) -> FlowResult<FlowOutcome> {
        console.write_line("")?;
        console.write_line("--- Modify Patient ---")?;

        let Some(id) = prompt_id(console, "Enter the ID of the patient to modify: ")? else {
            return Ok(FlowOutcome::InvalidId);
        };
        let current = match self.load(console, id)? {
            Ok(patient) => patient,
            Err(outcome) => return Ok(outcome),
        };

        print_patient(console, &current)?;
        console.write_line("")?;
        console.write_line("--- Enter new values (or press ENTER to keep the current one) ---")?;

        let full_name = keep_or_replace(
            &console.read_line(&format!("New name ({}): ", current.full_name))?,
            &current.full_name,
        );
        let national_id = keep_or_replace(
            &console.read_line(&format!("New national ID ({}): ", current.national_id))?,
            &current.national_id,
        );
        let birth_date = prompt_date(
            console,
            &format!(
                "New birth date (DD/MM/YYYY) ({}): ",
                format_display_date(current.birth_date)
            ),
            Some(current.birth_date),
        )?;
        let phone = keep_or_replace(
            &console.read_line(&format!("New phone ({}): ", current.phone))?,
            &current.phone,
        );
        let address_input = console.read_line(&format!(
            "New address ({}): ",
            current.address.as_deref().unwrap_or("optional")
        ))?;
        let address = match address_input.trim() {
            "" => current.address.clone(),
            value => Some(value.to_string()),
        };

        let draft = PatientDraft {
            full_name,
            national_id,
            birth_date,
            phone,
            address,
        };

        match self.repo.update(id, &draft) {
            Ok(true) => {
                console.write_line(&format!("Patient ID {id} updated successfully."))?;
                Ok(FlowOutcome::Updated(id))
            }
            Ok(false) => {
                console.write_line(&format!("Patient ID {id} not found for update."))?;
                Ok(FlowOutcome::NotFound(id))
            }
            Err(err) => {
                report_failure(console, "update patient", &err)?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    /// Deletes a patient after an explicit `Y` confirmation.
    pub fn remove<C: Console>(&self, console: &mut C) -> FlowResult<FlowOutcome> {
        console.write_line("")?;
        console.write_line("--- Remove Patient ---")?;

        let Some(id) = prompt_id(console, "Enter the ID of the patient to REMOVE: ")? else {
            return Ok(FlowOutcome::InvalidId);
        };
        let patient = match self.load(console, id)? {
            Ok(patient) => patient,
            Err(outcome) => return Ok(outcome),
        };

        let answer = console.read_line(&format!(
            "CONFIRM removal of patient {} (y/N): ",
            patient.full_name
        ))?;
        if !answer.trim().eq_ignore_ascii_case(CONFIRM_TOKEN) {
            console.write_line("Removal cancelled.")?;
            return Ok(FlowOutcome::Cancelled);
        }

        match self.repo.delete(id) {
            Ok(true) => {
                console.write_line(&format!("Patient ID {id} removed successfully."))?;
                Ok(FlowOutcome::Removed(id))
            }
            Ok(false) => {
                console.write_line(&format!("Patient ID {id} not found."))?;
                Ok(FlowOutcome::NotFound(id))
            }
            Err(err) => {
                report_failure(console, "remove patient", &err)?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    /// Finds the patient or prints why it could not be loaded.
    fn load<C: Console>(
        &self,
        console: &mut C,
        id: PatientId,
    ) -> FlowResult<Result<Patient, FlowOutcome>> {
        match self.repo.find_by_id(id) {
            Ok(Some(patient)) => Ok(Ok(patient)),
            Ok(None) => {
                console.write_line(&format!("Patient with ID {id} not found."))?;
                Ok(Err(FlowOutcome::NotFound(id)))
            }
            Err(err) => {
                report_failure(console, "look up patient", &err)?;
                Ok(Err(FlowOutcome::Failed))
            }
        }
    }
}

fn prompt_id<C: Console>(console: &mut C, prompt: &str) -> FlowResult<Option<PatientId>> {
    let input = console.read_line(prompt)?;
    match input.trim().parse::<PatientId>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            console.write_line("Invalid ID. Please enter a number.")?;
            Ok(None)
        }
    }
}

/// Prompts until a valid display date is entered.
///
/// With `keep = Some(date)`, an empty answer returns `date` unchanged.
fn prompt_date<C: Console>(
    console: &mut C,
    prompt: &str,
    keep: Option<NaiveDate>,
) -> FlowResult<NaiveDate> {
    loop {
        let input = console.read_line(prompt)?;
        if let Some(current) = keep {
            if input.trim().is_empty() {
                return Ok(current);
            }
        }
        match parse_display_date(&input) {
            Ok(date) => return Ok(date),
            Err(err) => {
                console.write_line(&format!("Invalid birth date: {err}. Use DD/MM/YYYY."))?
            }
        }
    }
}

fn keep_or_replace(input: &str, current: &str) -> String {
    match input.trim() {
        "" => current.to_string(),
        value => value.to_string(),
    }
}

fn print_patient<C: Console>(console: &mut C, patient: &Patient) -> FlowResult<()> {
    console.write_line("")?;
    console.write_line("--- Current Data ---")?;
    console.write_line(&format!("Name: {}", patient.full_name))?;
    console.write_line(&format!("National ID: {}", patient.national_id))?;
    console.write_line(&format!(
        "Birth date: {}",
        format_display_date(patient.birth_date)
    ))?;
    console.write_line(&format!("Phone: {}", patient.phone))?;
    console.write_line(&format!(
        "Address: {}",
        patient.address.as_deref().unwrap_or("[not provided]")
    ))?;
    Ok(())
}

fn report_failure<C: Console>(console: &mut C, action: &str, err: &RepoError) -> FlowResult<()> {
    warn!("event=flow_failure module=flow action={action} error={err}");
    let message = match err {
        RepoError::Connection(_) => format!("Failed to {action}: no database connection ({err})."),
        RepoError::Constraint { message, .. } => format!("Failed to {action}: {message}"),
        other => format!("Failed to {action}: {other}"),
    };
    console.write_line(&message)?;
    Ok(())
}
