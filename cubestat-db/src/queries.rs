//! Read queries for the results store.
//!
//! Provides person lookup by id and name, per-person results, the nemesis
//! join, and listing helpers.

use std::collections::BTreeMap;

use cubestat_core::{Country, Event, EventFormat, Gender, Mark, Person, Ranks, ResultRecord};
use rusqlite::{Connection, Row, params, params_from_iter};

use crate::operations::OperationError;

/// SQLite's default host-parameter limit is well above this.
const ID_BATCH: usize = 500;

// ── Person Lookups ──────────────────────────────────────────────────────────

/// Find a person by exact WCA id (case-insensitive).
pub fn find_person_by_id(conn: &Connection, wca_id: &str) -> Result<Option<Person>, OperationError> {
    let mut stmt = conn.prepare_cached(
        "SELECT wca_id, name, country_id, continent_id, gender FROM persons WHERE wca_id = ?1",
    )?;
    let result = stmt.query_row(params![wca_id.trim().to_uppercase()], row_to_person);
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find every person whose full name, latin name or local name equals `name`.
///
/// Latin comparisons are case-insensitive. Results are ordered by id.
pub fn find_persons_by_name(conn: &Connection, name: &str) -> Result<Vec<Person>, OperationError> {
    let mut stmt = conn.prepare_cached(
        "SELECT wca_id, name, country_id, continent_id, gender FROM persons
         WHERE name = ?1 COLLATE NOCASE
            OR latin_name = ?1 COLLATE NOCASE
            OR local_name = ?1
         ORDER BY wca_id",
    )?;
    let rows = stmt.query_map(params![name.trim()], row_to_person)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Load persons for a set of ids. Unknown ids are skipped; order is by id.
pub fn persons_by_ids(conn: &Connection, ids: &[String]) -> Result<Vec<Person>, OperationError> {
    let mut persons = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_BATCH) {
        let placeholders = vec!["?"; chunk.len()].join(",");
        let sql = format!(
            "SELECT wca_id, name, country_id, continent_id, gender FROM persons WHERE wca_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_person)?;
        for row in rows {
            persons.push(row?);
        }
    }
    persons.sort_by(|a, b| a.wca_id.cmp(&b.wca_id));
    Ok(persons)
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        wca_id: row.get(0)?,
        name: row.get(1)?,
        country_id: row.get(2)?,
        continent_id: row.get(3)?,
        gender: row
            .get::<_, Option<String>>(4)?
            .as_deref()
            .and_then(Gender::from_export),
    })
}

// ── Results ─────────────────────────────────────────────────────────────────

/// All result rows for a person, ordered by the event display order.
pub fn results_for_person(
    conn: &Connection,
    person_id: &str,
) -> Result<Vec<ResultRecord>, OperationError> {
    let mut stmt = conn.prepare_cached(
        "SELECT r.person_id, r.event_id,
                r.single, r.single_world_rank, r.single_continent_rank, r.single_country_rank,
                r.average, r.average_world_rank, r.average_continent_rank, r.average_country_rank
         FROM results r LEFT JOIN events e ON e.id = r.event_id
         WHERE r.person_id = ?1
         ORDER BY COALESCE(e.rank, 1000000), r.event_id",
    )?;
    let rows = stmt.query_map(params![person_id], row_to_result)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Everyone who beats `subject_id` in every event both have a row in.
///
/// One pass over the subject's events: each other row in those events is
/// joined to the subject's row and the candidate survives only if it wins
/// all of them. Winning an event means a strictly better finite single and,
/// unless neither side has a finite average, a strictly better finite
/// average. Non-positive and missing values are not finite. Ordered by id.
pub fn nemeses_of(conn: &Connection, subject_id: &str) -> Result<Vec<Person>, OperationError> {
    let mut stmt = conn.prepare_cached(NEMESIS_SQL)?;
    let rows = stmt.query_map(params![subject_id], row_to_person)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

const NEMESIS_SQL: &str = r#"
WITH mine AS (
    SELECT event_id, COALESCE(single, 0) AS single, COALESCE(average, 0) AS average
    FROM results
    WHERE person_id = ?1
),
beaten AS (
    SELECT r.person_id
    FROM mine m
    JOIN results r ON r.event_id = m.event_id AND r.person_id <> ?1
    GROUP BY r.person_id
    HAVING MIN(
        COALESCE(r.single, 0) > 0
        AND (m.single <= 0 OR COALESCE(r.single, 0) < m.single)
        AND (
            (COALESCE(r.average, 0) <= 0 AND m.average <= 0)
            OR (COALESCE(r.average, 0) > 0
                AND (m.average <= 0 OR COALESCE(r.average, 0) < m.average))
        )
    ) = 1
)
SELECT p.wca_id, p.name, p.country_id, p.continent_id, p.gender
FROM beaten b
JOIN persons p ON p.wca_id = b.person_id
ORDER BY p.wca_id
"#;

fn rank_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u32>> {
    let raw: Option<i64> = row.get(idx)?;
    Ok(raw.filter(|&r| r > 0).and_then(|r| u32::try_from(r).ok()))
}

fn row_to_result(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    let single: Option<i64> = row.get(2)?;
    let average: Option<i64> = row.get(6)?;
    Ok(ResultRecord {
        person_id: row.get(0)?,
        event_id: row.get(1)?,
        single: single.and_then(Mark::from_raw),
        single_ranks: Ranks {
            world: rank_col(row, 3)?,
            continent: rank_col(row, 4)?,
            country: rank_col(row, 5)?,
        },
        average: average.and_then(Mark::from_raw),
        average_ranks: Ranks {
            world: rank_col(row, 7)?,
            continent: rank_col(row, 8)?,
            country: rank_col(row, 9)?,
        },
    })
}

// ── Listings ────────────────────────────────────────────────────────────────

/// All events in display order.
pub fn list_events(conn: &Connection) -> Result<Vec<Event>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name, rank, format FROM events ORDER BY rank, id")?;
    let rows = stmt.query_map([], |row| {
        let format: String = row.get(3)?;
        Ok(Event {
            id: row.get(0)?,
            name: row.get(1)?,
            rank: row.get(2)?,
            format: EventFormat::from_export(&format),
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All countries.
pub fn list_countries(conn: &Connection) -> Result<Vec<Country>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name, continent_id, iso2 FROM countries ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Country {
            id: row.get(0)?,
            name: row.get(1)?,
            continent_id: row.get(2)?,
            iso2: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// The metadata table as a key → value map.
pub fn metadata(conn: &Connection) -> Result<BTreeMap<String, String>, OperationError> {
    let mut stmt = conn.prepare("SELECT key, value FROM metadata")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts for a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub persons: i64,
    pub events: i64,
    pub countries: i64,
    pub results: i64,
}

pub fn store_stats(conn: &Connection) -> Result<StoreStats, OperationError> {
    let count = |table: &str| -> Result<i64, OperationError> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n)
    };
    Ok(StoreStats {
        persons: count("persons")?,
        events: count("events")?,
        countries: count("countries")?,
        results: count("results")?,
    })
}
