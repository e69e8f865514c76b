use cubestat_core::Person;
use cubestat_db::*;

#[test]
fn memory_store_has_all_tables() {
    let conn = open_memory().unwrap();
    for table in [
        "schema_version",
        "metadata",
        "continents",
        "countries",
        "events",
        "persons",
        "results",
    ] {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "missing table {table}");
    }
}

#[test]
fn create_schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
    create_indexes(&conn).unwrap();
    let versions: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 1);
}

#[test]
fn verify_rejects_empty_store() {
    let conn = open_memory().unwrap();
    assert!(matches!(verify_store(&conn), Err(SchemaError::Empty)));
}

#[test]
fn verify_accepts_populated_store() {
    let conn = open_memory().unwrap();
    insert_person(
        &conn,
        &Person {
            wca_id: "2009ZEMD01".to_string(),
            name: "Feliks Zemdegs".to_string(),
            country_id: "Australia".to_string(),
            continent_id: Some("_Oceania".to_string()),
            gender: None,
        },
    )
    .unwrap();
    verify_store(&conn).unwrap();
}

#[test]
fn verify_rejects_wrong_version() {
    let conn = open_memory().unwrap();
    conn.execute("UPDATE schema_version SET version = 99", [])
        .unwrap();
    let err = verify_store(&conn).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::VersionMismatch {
            expected: 2,
            found: 99
        }
    ));
}

#[test]
fn verify_rejects_missing_table() {
    let conn = open_memory().unwrap();
    conn.execute_batch("DROP TABLE results").unwrap();
    assert!(matches!(
        verify_store(&conn),
        Err(SchemaError::MissingTable(t)) if t == "results"
    ));
}

#[test]
fn readonly_open_of_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wca.db");
    {
        let conn = open_database(&path).unwrap();
        create_indexes(&conn).unwrap();
        insert_person(
            &conn,
            &Person {
                wca_id: "2016KOLA02".to_string(),
                name: "Tymon Kolasiński".to_string(),
                country_id: "Poland".to_string(),
                continent_id: Some("_Europe".to_string()),
                gender: None,
            },
        )
        .unwrap();
    }
    let ro = open_readonly(&path).unwrap();
    assert!(find_person_by_id(&ro, "2016kola02").unwrap().is_some());
    assert!(ro.execute("DELETE FROM persons", []).is_err());
}

#[test]
fn readonly_open_rejects_empty_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wca.db");
    drop(open_database(&path).unwrap());
    assert!(open_readonly(&path).is_err());
}
