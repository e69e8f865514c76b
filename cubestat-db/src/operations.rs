//! Bulk-load write operations.
//!
//! Every function writes through `prepare_cached` so the loader can call
//! them once per row inside a single transaction.

use cubestat_core::{Country, Event, Gender, Mark, Person, Ranks, split_name};
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// ── Geography ───────────────────────────────────────────────────────────────

pub fn insert_continent(conn: &Connection, id: &str, name: &str) -> Result<(), OperationError> {
    conn.prepare_cached("INSERT OR REPLACE INTO continents (id, name) VALUES (?1, ?2)")?
        .execute(params![id, name])?;
    Ok(())
}

pub fn insert_country(conn: &Connection, country: &Country) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT OR REPLACE INTO countries (id, name, continent_id, iso2) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
        country.id,
        country.name,
        country.continent_id,
        country.iso2
    ])?;
    Ok(())
}

// ── Events ──────────────────────────────────────────────────────────────────

pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT OR REPLACE INTO events (id, name, rank, format) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
        event.id,
        event.name,
        event.rank,
        event.format.as_str()
    ])?;
    Ok(())
}

// ── Persons ─────────────────────────────────────────────────────────────────

/// Insert a person. Returns `false` when the id was already present; the
/// first row for an id wins.
pub fn insert_person(conn: &Connection, person: &Person) -> Result<bool, OperationError> {
    let (latin, local) = split_name(&person.name);
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO persons
                 (wca_id, name, latin_name, local_name, country_id, continent_id, gender)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?
        .execute(params![
            person.wca_id,
            person.name,
            latin,
            local,
            person.country_id,
            person.continent_id,
            person.gender.map(Gender::code),
        ])?;
    Ok(changed > 0)
}

// ── Results ─────────────────────────────────────────────────────────────────

fn rank_param(rank: Option<u32>) -> Option<i64> {
    rank.map(i64::from)
}

/// Set the best single (and its ranks) for a person/event, creating the row if needed.
pub fn upsert_single(
    conn: &Connection,
    person_id: &str,
    event_id: &str,
    mark: Option<Mark>,
    ranks: Ranks,
) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT INTO results (person_id, event_id, single, single_world_rank, single_continent_rank, single_country_rank)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(person_id, event_id) DO UPDATE SET
             single = excluded.single,
             single_world_rank = excluded.single_world_rank,
             single_continent_rank = excluded.single_continent_rank,
             single_country_rank = excluded.single_country_rank",
    )?
    .execute(params![
        person_id,
        event_id,
        mark.map(Mark::to_raw),
        rank_param(ranks.world),
        rank_param(ranks.continent),
        rank_param(ranks.country),
    ])?;
    Ok(())
}

/// Set the best average (and its ranks) for a person/event, creating the row if needed.
pub fn upsert_average(
    conn: &Connection,
    person_id: &str,
    event_id: &str,
    mark: Option<Mark>,
    ranks: Ranks,
) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT INTO results (person_id, event_id, average, average_world_rank, average_continent_rank, average_country_rank)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(person_id, event_id) DO UPDATE SET
             average = excluded.average,
             average_world_rank = excluded.average_world_rank,
             average_continent_rank = excluded.average_continent_rank,
             average_country_rank = excluded.average_country_rank",
    )?
    .execute(params![
        person_id,
        event_id,
        mark.map(Mark::to_raw),
        rank_param(ranks.world),
        rank_param(ranks.continent),
        rank_param(ranks.country),
    ])?;
    Ok(())
}

// ── Metadata ────────────────────────────────────────────────────────────────

pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<(), OperationError> {
    conn.prepare_cached("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")?
        .execute(params![key, value])?;
    Ok(())
}
