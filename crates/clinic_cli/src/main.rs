//! Interactive patient registry.
//!
//! # Responsibility
//! - Load configuration, start logging and wire the store into the flows.
//! - Run the numbered menu until the operator exits or input ends.

mod menu;

use clinic_core::{
    core_version, init_logging, Console, ConnectionProvider, FlowError, PatientFlows,
    PatientRepository, RegistryConfig, SqlitePatientRepository, StdConsole,
};
use log::info;
use menu::{version_banner, MenuChoice, MENU_LINES};
use std::io::ErrorKind;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match RegistryConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging.level, &config.logging.dir) {
        eprintln!("logging error: {err}");
        return ExitCode::FAILURE;
    }

    let repo = SqlitePatientRepository::new(ConnectionProvider::new(config.database.clone()));
    let flows = PatientFlows::new(repo);
    let mut console = StdConsole::stdio();

    match run_menu(&flows, &mut console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(FlowError::Io(err)) if err.kind() == ErrorKind::UnexpectedEof => {
            info!("event=session_end module=cli status=ok reason=eof");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_menu<R, C>(flows: &PatientFlows<R>, console: &mut C) -> Result<(), FlowError>
where
    R: PatientRepository,
    C: Console,
{
    info!(
        "event=session_start module=cli status=ok core_version={}",
        core_version()
    );
    console.write_line(&version_banner())?;
    loop {
        console.write_line("")?;
        for line in MENU_LINES {
            console.write_line(line)?;
        }

        let choice = console.read_line("Choose an option: ")?;
        let outcome = match MenuChoice::parse(&choice) {
            Some(MenuChoice::CreatePatient) => flows.create(console)?,
            Some(MenuChoice::ListPatients) => flows.list(console)?,
            Some(MenuChoice::ModifyPatient) => flows.modify(console)?,
            Some(MenuChoice::RemovePatient) => flows.remove(console)?,
            Some(MenuChoice::ManageProfessionals | MenuChoice::ScheduleAppointment) => {
                console.write_line("This option is not available yet.")?;
                continue;
            }
            Some(MenuChoice::Exit) => {
                console.write_line("Closing the registry. Goodbye!")?;
                info!("event=session_end module=cli status=ok reason=exit");
                return Ok(());
            }
            None => {
                console.write_line("Invalid option. Please try again.")?;
                continue;
            }
        };
        info!("event=menu_action module=cli status=done outcome={outcome:?}");
    }
}
