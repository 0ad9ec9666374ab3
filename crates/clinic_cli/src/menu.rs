//! Main menu choices.

use clinic_core::core_version;

/// One entry of the numbered main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreatePatient,
    ListPatients,
    ModifyPatient,
    RemovePatient,
    ManageProfessionals,
    ScheduleAppointment,
    Exit,
}

pub const MENU_LINES: &[&str] = &[
    "=== Clinic Patient Registry ===",
    "1. Register new patient",
    "2. List patients",
    "3. Modify patient",
    "4. Remove patient",
    "5. Manage professionals",
    "6. Schedule appointment",
    "7. Exit",
];

/// Start-up line naming the core build in use.
pub fn version_banner() -> String {
    format!("clinic_core version={}", core_version())
}

impl MenuChoice {
    /// Parses the operator's answer; `None` for anything outside 1-7.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::CreatePatient),
            "2" => Some(Self::ListPatients),
            "3" => Some(Self::ModifyPatient),
            "4" => Some(Self::RemovePatient),
            "5" => Some(Self::ManageProfessionals),
            "6" => Some(Self::ScheduleAppointment),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}
