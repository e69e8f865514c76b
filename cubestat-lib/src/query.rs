//! Person lookup and per-person results.

use cubestat_core::{Event, Mark, Metric, Person, RankLabel, Ranks, ResultRecord};

use crate::error::QueryError;
use crate::store::{EventCatalog, Snapshot};

/// One event of a person's results, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub event: Event,
    pub single: Option<Mark>,
    pub average: Option<Mark>,
    pub single_ranks: Ranks,
    pub average_ranks: Ranks,
    /// Widest-scope rank within the display cap.
    pub single_label: Option<RankLabel>,
    pub average_label: Option<RankLabel>,
}

impl ResultLine {
    pub fn from_record(record: &ResultRecord, catalog: &EventCatalog, cap: u32) -> Self {
        Self {
            event: catalog.resolve(&record.event_id),
            single: record.single,
            average: record.average,
            single_ranks: record.single_ranks,
            average_ranks: record.average_ranks,
            single_label: record.ranks(Metric::Single).label(cap),
            average_label: record.ranks(Metric::Average).label(cap),
        }
    }
}

/// A person with their country name and results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub person: Person,
    pub country_name: Option<String>,
    pub results: Vec<ResultLine>,
}

/// Resolve a query to exactly one person.
///
/// An exact WCA id wins outright. Otherwise the query is matched against the
/// full name, its latin part and its local part; several matches are
/// reported as ambiguous with every candidate.
pub fn find_person(snapshot: &Snapshot, query: &str) -> Result<Person, QueryError> {
    let q = query.trim();
    if q.is_empty() {
        return Err(QueryError::NotFound(query.to_string()));
    }
    snapshot.with_conn(|conn| {
        if let Some(person) = cubestat_db::find_person_by_id(conn, q)? {
            return Ok(person);
        }
        let mut matches = cubestat_db::find_persons_by_name(conn, q)?;
        match matches.len() {
            0 => Err(QueryError::NotFound(q.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(QueryError::Ambiguous {
                query: q.to_string(),
                candidates: matches,
            }),
        }
    })
}

/// Raw result records of a person, in event display order.
pub(crate) fn records(snapshot: &Snapshot, person: &Person) -> Result<Vec<ResultRecord>, QueryError> {
    snapshot
        .with_conn(|conn| cubestat_db::results_for_person(conn, &person.wca_id))
        .map_err(QueryError::from)
}

/// A person's results, one line per event they have a row in.
pub fn get_results(
    snapshot: &Snapshot,
    person: &Person,
    cap: u32,
) -> Result<Vec<ResultLine>, QueryError> {
    let records = records(snapshot, person)?;
    let catalog = snapshot.events();
    let mut lines: Vec<ResultLine> = records
        .iter()
        .map(|r| ResultLine::from_record(r, catalog, cap))
        .collect();
    lines.sort_by(|a, b| a.event.rank.cmp(&b.event.rank));
    Ok(lines)
}

/// Find a person and load their results.
pub fn lookup(snapshot: &Snapshot, query: &str, cap: u32) -> Result<PersonProfile, QueryError> {
    let person = find_person(snapshot, query)?;
    let results = get_results(snapshot, &person, cap)?;
    let country_name = snapshot
        .countries()
        .get(&person.country_id)
        .map(|c| c.name.clone());
    Ok(PersonProfile {
        person,
        country_name,
        results,
    })
}
