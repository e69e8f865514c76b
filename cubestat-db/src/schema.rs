//! SQLite schema creation and verification.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Store is missing table '{0}'")]
    MissingTable(String),
    #[error("Store contains no persons")]
    Empty,
}

/// Current schema version. Stores built with another version are rebuilt,
/// never migrated in place.
pub const CURRENT_VERSION: i32 = 2;

/// Tables every committed store must contain.
pub const REQUIRED_TABLES: &[&str] = &[
    "schema_version",
    "metadata",
    "continents",
    "countries",
    "events",
    "persons",
    "results",
];

/// Create all tables if they don't exist. Secondary indexes are created
/// separately by [`create_indexes`] so bulk loads can insert first.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? == 0 {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_VERSION],
        )?;
    }
    Ok(())
}

/// Create the lookup indexes. Idempotent.
pub fn create_indexes(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(INDEX_SQL)?;
    Ok(())
}

/// Open (or create) a writable store at `path` with the full schema.
///
/// Used for building a fresh store; journaling is relaxed because an
/// unfinished build file is discarded, never repaired.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=DELETE; PRAGMA synchronous=OFF;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Open a committed store read-only and check it is usable.
pub fn open_readonly(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    verify_store(&conn)?;
    Ok(conn)
}

/// Open an in-memory store with the full schema and indexes. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    create_indexes(&conn)?;
    Ok(conn)
}

/// Check that a store has the current schema version, every required
/// table, and at least one person.
pub fn verify_store(conn: &Connection) -> Result<(), SchemaError> {
    for table in REQUIRED_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(SchemaError::MissingTable(table.to_string()));
        }
    }

    let found = get_schema_version(conn)?;
    if found != CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found,
        });
    }

    let has_persons: bool =
        conn.query_row("SELECT EXISTS(SELECT 1 FROM persons)", [], |row| row.get(0))?;
    if !has_persons {
        return Err(SchemaError::Empty);
    }
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Export and build facts (export_date, format_version, built_at, ...)
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS continents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS countries (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    continent_id TEXT NOT NULL DEFAULT '',
    iso2 TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    rank INTEGER NOT NULL,
    format TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    wca_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    latin_name TEXT NOT NULL,
    local_name TEXT,
    country_id TEXT NOT NULL,
    continent_id TEXT,
    gender TEXT
);

-- One row per (person, event). NULL = no value, negative = DNF.
CREATE TABLE IF NOT EXISTS results (
    person_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    single INTEGER,
    single_world_rank INTEGER,
    single_continent_rank INTEGER,
    single_country_rank INTEGER,
    average INTEGER,
    average_world_rank INTEGER,
    average_continent_rank INTEGER,
    average_country_rank INTEGER,
    PRIMARY KEY (person_id, event_id)
);
"#;

const INDEX_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_persons_name ON persons(name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_persons_latin_name ON persons(latin_name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_persons_local_name ON persons(local_name);
CREATE INDEX IF NOT EXISTS idx_persons_country ON persons(country_id);
CREATE INDEX IF NOT EXISTS idx_results_event_single ON results(event_id, single);
CREATE INDEX IF NOT EXISTS idx_results_event_average ON results(event_id, average);
"#;
