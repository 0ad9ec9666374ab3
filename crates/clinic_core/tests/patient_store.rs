use chrono::NaiveDate;
use clinic_core::{
    ConnectionProvider, ConstraintKind, DatabaseConfig, Patient, PatientDraft, PatientId,
    PatientRepository, RepoError, SqlitePatientRepository,
};
use rusqlite::Connection;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    repo: SqlitePatientRepository,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let provider = ConnectionProvider::new(DatabaseConfig::new(dir.path().join("registry.db")));
        // Applies migrations so raw connections see the schema.
        drop(provider.connect().expect("migrate fixture database"));
        Self {
            dir,
            repo: SqlitePatientRepository::new(provider),
        }
    }

    fn raw(&self) -> Connection {
        Connection::open(self.dir.path().join("registry.db")).expect("open raw connection")
    }

    fn load(&self, id: PatientId) -> Patient {
        self.repo
            .find_by_id(id)
            .expect("find patient")
            .expect("patient exists")
    }

    fn row_count(&self) -> i64 {
        self.raw()
            .query_row("SELECT COUNT(*) FROM Pacientes;", [], |row| row.get(0))
            .expect("count rows")
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn maria() -> PatientDraft {
    PatientDraft::from_input(
        "Maria Silva",
        "123.456.789-00",
        date(1990, 3, 15),
        "(11) 91234-5678",
        "",
    )
}

fn joao() -> PatientDraft {
    PatientDraft::from_input(
        "Joao Souza",
        "987.654.321-00",
        date(1985, 11, 2),
        "(21) 99876-5432",
        "Rua das Flores, 12",
    )
}

#[test]
fn create_then_find_returns_full_projection() {
    let fx = Fixture::new();

    let id = fx.repo.create(&joao()).expect("create joao");
    let loaded = fx.load(id);

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.to_draft(), joao());
}

#[test]
fn blank_address_is_stored_as_null_and_date_in_canonical_form() {
    let fx = Fixture::new();

    let id = fx.repo.create(&maria()).expect("create maria");

    let (address, stored_date): (Option<String>, String) = fx
        .raw()
        .query_row(
            "SELECT endereco, data_nascimento FROM Pacientes WHERE paciente_id = ?1;",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("read stored row");
    assert_eq!(address, None);
    assert_eq!(stored_date, "1990-03-15");

    let listed = fx.repo.list_all().expect("list patients");
    assert!(listed
        .iter()
        .any(|summary| summary.id == id && summary.full_name == "Maria Silva"));
}

#[test]
fn ids_are_assigned_by_storage_and_not_reused() {
    let fx = Fixture::new();

    let first = fx.repo.create(&maria()).expect("create maria");
    assert!(fx.repo.delete(first).expect("delete patient"));
    let second = fx.repo.create(&maria()).expect("create maria");

    assert_ne!(first, second);
}

#[test]
fn duplicate_national_id_fails_without_touching_existing_row() {
    let fx = Fixture::new();
    let id = fx.repo.create(&maria()).expect("create maria");

    let mut clash = joao();
    clash.national_id = maria().national_id;
    let err = fx.repo.create(&clash).expect_err("duplicate national id");

    match err {
        RepoError::Constraint { kind, message } => {
            assert_eq!(kind, ConstraintKind::Unique);
            assert!(message.contains("cpf"), "unexpected message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.row_count(), 1);
    assert_eq!(fx.load(id).to_draft(), maria());
}

#[test]
fn update_to_a_taken_national_id_is_rolled_back() {
    let fx = Fixture::new();
    fx.repo.create(&maria()).expect("create maria");
    let joao_id = fx.repo.create(&joao()).expect("create joao");

    let mut edit = joao();
    edit.national_id = maria().national_id;
    edit.phone = "000".to_string();
    let err = fx.repo.update(joao_id, &edit).expect_err("taken national id");

    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::Unique,
            ..
        }
    ));
    assert_eq!(fx.load(joao_id).to_draft(), joao());
}

#[test]
fn update_replaces_every_field() {
    let fx = Fixture::new();
    let id = fx.repo.create(&joao()).expect("create joao");

    let replacement = PatientDraft {
        full_name: "Joao P. Souza".to_string(),
        national_id: "111.222.333-44".to_string(),
        birth_date: date(1986, 1, 20),
        phone: "(21) 3333-0000".to_string(),
        address: None,
    };
    assert!(fx.repo.update(id, &replacement).expect("update patient"));

    let loaded = fx.load(id);
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.to_draft(), replacement);
}

#[test]
fn update_of_unknown_id_reports_not_found_and_changes_nothing() {
    let fx = Fixture::new();
    let id = fx.repo.create(&maria()).expect("create maria");

    assert!(!fx.repo.update(id + 100, &joao()).expect("update patient"));

    assert_eq!(fx.row_count(), 1);
    assert_eq!(fx.load(id).to_draft(), maria());
}

#[test]
fn delete_removes_exactly_one_row() {
    let fx = Fixture::new();
    let keep = fx.repo.create(&maria()).expect("create maria");
    let drop_id = fx.repo.create(&joao()).expect("create joao");

    assert!(fx.repo.delete(drop_id).expect("delete patient"));

    assert!(fx.repo.find_by_id(drop_id).expect("find patient").is_none());
    assert!(fx.repo.find_by_id(keep).expect("find patient").is_some());
    assert_eq!(fx.row_count(), 1);
    assert!(!fx.repo.delete(drop_id).expect("delete patient"));
}

#[test]
fn delete_with_dependent_rows_is_rejected_and_rolled_back() {
    let fx = Fixture::new();
    let id = fx.repo.create(&maria()).expect("create maria");
    fx.raw()
        .execute_batch(&format!(
            "CREATE TABLE Consultas (
                consulta_id INTEGER PRIMARY KEY,
                paciente_id INTEGER NOT NULL REFERENCES Pacientes(paciente_id)
            );
            INSERT INTO Consultas (paciente_id) VALUES ({id});"
        ))
        .expect("add dependent table");

    let err = fx.repo.delete(id).expect_err("dependent rows block delete");

    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
    assert!(fx.repo.find_by_id(id).expect("find patient").is_some());
}

#[test]
fn list_all_omits_nothing_and_is_empty_on_fresh_database() {
    let fx = Fixture::new();
    assert!(fx.repo.list_all().expect("list patients").is_empty());

    fx.repo.create(&maria()).expect("create maria");
    fx.repo.create(&joao()).expect("create joao");

    let names: Vec<String> = fx
        .repo
        .list_all()
        .expect("list patients")
        .into_iter()
        .map(|summary| summary.full_name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Maria Silva".to_string()));
    assert!(names.contains(&"Joao Souza".to_string()));
}

#[test]
fn blank_required_fields_are_rejected_before_sql() {
    let fx = Fixture::new();
    let mut draft = maria();
    draft.phone = "  ".to_string();

    let err = fx.repo.create(&draft).expect_err("blank phone");

    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(fx.row_count(), 0);
}

#[test]
fn unreachable_database_is_a_connection_error_for_every_operation() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let provider = ConnectionProvider::new(DatabaseConfig::new(
        dir.path().join("missing").join("registry.db"),
    ));
    let repo = SqlitePatientRepository::new(provider);

    assert!(matches!(repo.create(&maria()), Err(RepoError::Connection(_))));
    assert!(matches!(repo.list_all(), Err(RepoError::Connection(_))));
    assert!(matches!(repo.find_by_id(1), Err(RepoError::Connection(_))));
    assert!(matches!(repo.update(1, &maria()), Err(RepoError::Connection(_))));
    assert!(matches!(repo.delete(1), Err(RepoError::Connection(_))));
}

#[test]
fn corrupt_birth_date_is_reported_as_invalid_data() {
    let fx = Fixture::new();
    let id = fx.repo.create(&maria()).expect("create maria");
    fx.raw()
        .execute(
            "UPDATE Pacientes SET data_nascimento = 'someday' WHERE paciente_id = ?1;",
            [id],
        )
        .expect("corrupt stored date");

    assert!(matches!(
        fx.repo.find_by_id(id),
        Err(RepoError::InvalidData(_))
    ));
}
