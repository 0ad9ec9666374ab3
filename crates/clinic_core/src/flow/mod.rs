//! Interaction flows for the patient registry.
//!
//! # Responsibility
//! - Prompt for input, validate it and call the record store.
//! - Turn every store outcome into a message for the operator.
//!
//! # Invariants
//! - No store call happens with an unparsed date or a blank required field.
//! - Store errors end as printed diagnostics; only console I/O errors escape.

mod console;
mod patient_flows;
mod table;

pub use console::{Console, StdConsole};
pub use patient_flows::{FlowError, FlowOutcome, FlowResult, PatientFlows, CONFIRM_TOKEN};
pub use table::render_patient_table;
