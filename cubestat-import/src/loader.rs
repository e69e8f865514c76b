//! Build a fresh results store from a downloaded export archive.
//!
//! The store is written to `<store>.building` and renamed over `<store>`
//! only after every table has loaded and the file verifies. A failed build
//! removes its building file and leaves the live store untouched.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cubestat_core::{Country, CountryTable, Event, EventFormat, Gender, Mark, Person, Ranks};
use cubestat_db::{OperationError, SchemaError, operations};
use cubestat_export::{ArchiveError, ExportArchive, TsvRow};
use rusqlite::Connection;
use thiserror::Error;

use crate::progress::ImportProgress;

/// Tables an archive must contain to be loadable.
pub const REQUIRED_TABLES: &[&str] = &[
    "countries",
    "events",
    "persons",
    "ranks_single",
    "ranks_average",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Table '{table}' line {line}: {message}")]
    Parse {
        table: String,
        line: u64,
        message: String,
    },
    #[error("Table '{table}' does not match the expected layout: {detail}")]
    SchemaMismatch { table: String, detail: String },
    #[error("Archive error: {0}")]
    Archive(ArchiveError),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ArchiveError> for LoadError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::MissingTable(table) => Self::SchemaMismatch {
                table,
                detail: "table missing from archive".to_string(),
            },
            ArchiveError::MissingColumn { table, column } => Self::SchemaMismatch {
                table,
                detail: format!("missing column '{column}'"),
            },
            ArchiveError::Row {
                table,
                line,
                message,
            } => Self::Parse {
                table,
                line,
                message,
            },
            other => Self::Archive(other),
        }
    }
}

/// Export facts recorded in the store's metadata table.
///
/// Fields left empty are filled from the archive's own `metadata.json`.
#[derive(Debug, Clone, Default)]
pub struct ExportStamp {
    pub export_date: Option<String>,
    pub format_version: Option<String>,
}

/// Row counts from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub continents: u64,
    pub countries: u64,
    pub events: u64,
    pub persons: u64,
    /// Historical name rows (sub id other than 1) and duplicate ids.
    pub skipped_persons: u64,
    pub single_rows: u64,
    pub average_rows: u64,
}

/// A committed build.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub store_path: PathBuf,
    pub export_date: Option<String>,
    pub format_version: Option<String>,
    pub stats: LoadStats,
    pub elapsed: Duration,
}

/// Builds store files at a fixed location.
#[derive(Debug, Clone)]
pub struct Loader {
    store_path: PathBuf,
}

impl Loader {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// The temporary file a build writes before it is committed.
    pub fn building_path(&self) -> PathBuf {
        let mut name = OsString::from(self.store_path.as_os_str());
        name.push(".building");
        PathBuf::from(name)
    }

    /// Load `archive_path` into a fresh store and atomically replace the live one.
    ///
    /// Blocking; run it on a blocking worker.
    pub fn build_store(
        &self,
        archive_path: &Path,
        stamp: &ExportStamp,
        progress: Option<&dyn ImportProgress>,
    ) -> Result<CommitResult, LoadError> {
        let started = Instant::now();
        let mut archive = ExportArchive::open(archive_path)?;
        for table in REQUIRED_TABLES {
            if !archive.has_table(table) {
                return Err(LoadError::SchemaMismatch {
                    table: table.to_string(),
                    detail: "table missing from archive".to_string(),
                });
            }
        }

        let mut stamp = stamp.clone();
        if stamp.export_date.is_none() || stamp.format_version.is_none() {
            if let Some(meta) = archive.metadata()? {
                stamp.export_date = stamp.export_date.or(meta.export_date);
                stamp.format_version = stamp.format_version.or(meta.export_format_version);
            }
        }

        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let building = self.building_path();
        remove_build_files(&building);

        let stats = match populate(&building, &mut archive, &stamp, progress) {
            Ok(stats) => stats,
            Err(e) => {
                remove_build_files(&building);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&building, &self.store_path) {
            remove_build_files(&building);
            return Err(e.into());
        }

        let result = CommitResult {
            store_path: self.store_path.clone(),
            export_date: stamp.export_date,
            format_version: stamp.format_version,
            stats,
            elapsed: started.elapsed(),
        };
        if let Some(p) = progress {
            p.on_complete(&format!(
                "Store committed: {} persons, {} events, {} result rows in {:.1}s",
                result.stats.persons,
                result.stats.events,
                result.stats.single_rows + result.stats.average_rows,
                result.elapsed.as_secs_f64()
            ));
        }
        Ok(result)
    }
}

fn remove_build_files(building: &Path) {
    let mut journal = OsString::from(building.as_os_str());
    journal.push("-journal");
    for path in [building.to_path_buf(), PathBuf::from(journal)] {
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not remove {}: {e}", path.display());
            }
        }
    }
}

fn populate(
    building: &Path,
    archive: &mut ExportArchive,
    stamp: &ExportStamp,
    progress: Option<&dyn ImportProgress>,
) -> Result<LoadStats, LoadError> {
    let conn = cubestat_db::open_database(building)?;
    let mut stats = LoadStats::default();

    let tx = conn.unchecked_transaction()?;

    phase(progress, "Loading countries");
    if archive.has_table("continents") {
        stats.continents = load_continents(&tx, archive, progress)?;
    }
    let countries = load_countries(&tx, archive, progress)?;
    stats.countries = countries.len() as u64;

    phase(progress, "Loading events");
    stats.events = load_events(&tx, archive, progress)?;

    phase(progress, "Loading persons");
    let (persons, skipped) = load_persons(&tx, archive, &countries, progress)?;
    stats.persons = persons;
    stats.skipped_persons = skipped;

    phase(progress, "Loading single rankings");
    stats.single_rows = load_ranks(&tx, archive, "ranks_single", progress)?;

    phase(progress, "Loading average rankings");
    stats.average_rows = load_ranks(&tx, archive, "ranks_average", progress)?;

    write_metadata(&tx, stamp, &stats)?;
    tx.commit()?;

    phase(progress, "Creating indexes");
    cubestat_db::create_indexes(&conn)?;
    cubestat_db::verify_store(&conn)?;
    Ok(stats)
}

fn phase(progress: Option<&dyn ImportProgress>, message: &str) {
    if let Some(p) = progress {
        p.on_phase(message);
    }
}

fn tick(progress: Option<&dyn ImportProgress>, table: &str, rows: u64) {
    if let Some(p) = progress {
        p.on_rows(table, rows);
    }
}

// ── Tables ──────────────────────────────────────────────────────────────────

fn load_continents(
    conn: &Connection,
    archive: &mut ExportArchive,
    progress: Option<&dyn ImportProgress>,
) -> Result<u64, LoadError> {
    let mut table = archive.table("continents")?;
    let id = table.column("id")?;
    let name = table.column("name")?;

    let mut count = 0;
    for row in table.rows() {
        let row = row?;
        operations::insert_continent(conn, row.get(id).trim(), row.get(name).trim())?;
        count += 1;
        tick(progress, "continents", count);
    }
    Ok(count)
}

fn load_countries(
    conn: &Connection,
    archive: &mut ExportArchive,
    progress: Option<&dyn ImportProgress>,
) -> Result<CountryTable, LoadError> {
    let mut table = archive.table("countries")?;
    let id = table.column("id")?;
    let name = table.column("name")?;
    let continent = table.column("continent_id")?;
    let iso2 = table.optional_column("iso2");

    let mut countries = Vec::new();
    for row in table.rows() {
        let row = row?;
        let country = Country {
            id: row.get(id).trim().to_string(),
            name: row.get(name).trim().to_string(),
            continent_id: row.get(continent).trim().to_string(),
            iso2: iso2.map(|c| row.get(c).trim().to_string()).unwrap_or_default(),
        };
        operations::insert_country(conn, &country)?;
        countries.push(country);
        tick(progress, "countries", countries.len() as u64);
    }
    Ok(CountryTable::new(countries))
}

fn load_events(
    conn: &Connection,
    archive: &mut ExportArchive,
    progress: Option<&dyn ImportProgress>,
) -> Result<u64, LoadError> {
    let mut table = archive.table("events")?;
    let id = table.column("id")?;
    let name = table.column("name")?;
    let rank = table.column("rank")?;
    let format = table.optional_column("format");

    let mut count = 0;
    for row in table.rows() {
        let row = row?;
        let event = Event {
            id: row.get(id).trim().to_string(),
            name: row.get(name).trim().to_string(),
            rank: int_field("events", &row, rank, "rank")?,
            format: format
                .map(|c| EventFormat::from_export(row.get(c)))
                .unwrap_or(EventFormat::Time),
        };
        operations::insert_event(conn, &event)?;
        count += 1;
        tick(progress, "events", count);
    }
    Ok(count)
}

fn load_persons(
    conn: &Connection,
    archive: &mut ExportArchive,
    countries: &CountryTable,
    progress: Option<&dyn ImportProgress>,
) -> Result<(u64, u64), LoadError> {
    let mut table = archive.table("persons")?;
    let id = match table.optional_column("wca_id") {
        Some(c) => c,
        None => table.column("id")?,
    };
    let name = table.column("name")?;
    let country = table.column("country_id")?;
    let sub_id = table.optional_column("sub_id");
    let gender = table.optional_column("gender");

    let mut inserted = 0;
    let mut skipped = 0;
    let mut unknown_countries = 0u64;
    let mut seen = 0;
    for row in table.rows() {
        let row = row?;
        seen += 1;
        tick(progress, "persons", seen);

        if let Some(c) = sub_id {
            if int_field("persons", &row, c, "sub_id")? != 1 {
                skipped += 1;
                continue;
            }
        }

        let country_id = row.get(country).trim();
        let continent_id = countries.continent_of(country_id).map(str::to_string);
        if continent_id.is_none() {
            unknown_countries += 1;
        }
        let person = Person {
            wca_id: row.get(id).trim().to_uppercase(),
            name: row.get(name).trim().to_string(),
            country_id: country_id.to_string(),
            continent_id,
            gender: gender.and_then(|c| Gender::from_export(row.get(c))),
        };
        if operations::insert_person(conn, &person)? {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }

    if unknown_countries > 0 {
        log::warn!("{unknown_countries} persons have a country with no known continent");
    }
    Ok((inserted, skipped))
}

fn load_ranks(
    conn: &Connection,
    archive: &mut ExportArchive,
    table_name: &str,
    progress: Option<&dyn ImportProgress>,
) -> Result<u64, LoadError> {
    let mut table = archive.table(table_name)?;
    let person = table.column("person_id")?;
    let event = table.column("event_id")?;
    let best = table.column("best")?;
    let world = table.column("world_rank")?;
    let continent = table.column("continent_rank")?;
    let country = table.column("country_rank")?;

    let mut count = 0;
    for row in table.rows() {
        let row = row?;
        let mark = opt_int_field(table_name, &row, best, "best")?.and_then(Mark::from_raw);
        let ranks = Ranks {
            world: rank_field(table_name, &row, world, "world_rank")?,
            continent: rank_field(table_name, &row, continent, "continent_rank")?,
            country: rank_field(table_name, &row, country, "country_rank")?,
        };
        let person_id = row.get(person).trim().to_uppercase();
        let event_id = row.get(event).trim();
        if table_name == "ranks_single" {
            operations::upsert_single(conn, &person_id, event_id, mark, ranks)?;
        } else {
            operations::upsert_average(conn, &person_id, event_id, mark, ranks)?;
        }
        count += 1;
        tick(progress, table_name, count);
    }
    Ok(count)
}

fn write_metadata(conn: &Connection, stamp: &ExportStamp, stats: &LoadStats) -> Result<(), LoadError> {
    if let Some(date) = &stamp.export_date {
        operations::set_metadata(conn, "export_date", date)?;
    }
    if let Some(version) = &stamp.format_version {
        operations::set_metadata(conn, "format_version", version)?;
    }
    operations::set_metadata(conn, "built_at", &chrono::Utc::now().to_rfc3339())?;
    operations::set_metadata(conn, "persons", &stats.persons.to_string())?;
    operations::set_metadata(conn, "events", &stats.events.to_string())?;
    operations::set_metadata(
        conn,
        "result_rows",
        &(stats.single_rows + stats.average_rows).to_string(),
    )?;
    Ok(())
}

// ── Field parsing ───────────────────────────────────────────────────────────

fn int_field(table: &str, row: &TsvRow, col: usize, column: &str) -> Result<i64, LoadError> {
    opt_int_field(table, row, col, column)?.ok_or_else(|| LoadError::Parse {
        table: table.to_string(),
        line: row.line,
        message: format!("column '{column}' is empty"),
    })
}

/// Integer field; empty means absent.
fn opt_int_field(
    table: &str,
    row: &TsvRow,
    col: usize,
    column: &str,
) -> Result<Option<i64>, LoadError> {
    let raw = row.get(col).trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>().map(Some).map_err(|_| LoadError::Parse {
        table: table.to_string(),
        line: row.line,
        message: format!("column '{column}': '{raw}' is not an integer"),
    })
}

fn rank_field(
    table: &str,
    row: &TsvRow,
    col: usize,
    column: &str,
) -> Result<Option<u32>, LoadError> {
    Ok(opt_int_field(table, row, col, column)?
        .filter(|&r| r > 0)
        .and_then(|r| u32::try_from(r).ok()))
}
