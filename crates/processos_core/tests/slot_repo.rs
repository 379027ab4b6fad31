use processos_core::db::open_db;
use processos_core::{RepoError, SlotRepository, SqliteSlotRepository};

#[test]
fn sqlite_slot_replaces_value_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slots.db");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteSlotRepository::new(&conn);
        assert_eq!(repo.read_slot("processos").unwrap(), None);
        repo.write_slot("processos", r#"[{"a":1}]"#).unwrap();
        repo.write_slot("processos", r#"[{"a":2}]"#).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    assert_eq!(
        repo.read_slot("processos").unwrap().as_deref(),
        Some(r#"[{"a":2}]"#)
    );
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_slots_are_independent_and_clearable() {
    let conn = processos_core::db::open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    repo.write_slot("processos", "[]").unwrap();
    repo.write_slot("rascunho", "{}").unwrap();

    assert!(repo.clear_slot("rascunho").unwrap());
    assert!(!repo.clear_slot("rascunho").unwrap());
    assert_eq!(repo.read_slot("rascunho").unwrap(), None);
    assert_eq!(repo.read_slot("processos").unwrap().as_deref(), Some("[]"));
}

#[test]
fn sqlite_slot_rejects_invalid_key() {
    let conn = processos_core::db::open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    assert!(matches!(
        repo.write_slot("processos ", "[]"),
        Err(RepoError::InvalidKey(_))
    ));
}

#[test]
fn owning_repository_keeps_connection_alive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("owned.db");

    let repo = SqliteSlotRepository::new(open_db(&path).unwrap());
    repo.write_slot("processos", "[]").unwrap();
    assert_eq!(repo.read_slot("processos").unwrap().as_deref(), Some("[]"));
    drop(repo);

    let reopened = SqliteSlotRepository::new(open_db(&path).unwrap());
    assert_eq!(reopened.read_slot("processos").unwrap().as_deref(), Some("[]"));
}
