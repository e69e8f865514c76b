//! Nemesis discovery.
//!
//! A nemesis of S is someone who shares at least one event with S and beats
//! S in every shared event: a strictly better finite single and, unless
//! neither has a finite average, a strictly better finite average.

use std::collections::HashMap;

use cubestat_core::{Person, ResultRecord, Scope, Verdict, judge};

use crate::error::QueryError;
use crate::store::Snapshot;

/// Whether `candidate` beats `subject` in one event.
pub fn dominates(candidate: &ResultRecord, subject: &ResultRecord) -> bool {
    if judge(candidate.single, subject.single) != Verdict::Left {
        return false;
    }
    let any_average = candidate.average.is_some_and(|m| m.is_finite())
        || subject.average.is_some_and(|m| m.is_finite());
    !any_average || judge(candidate.average, subject.average) == Verdict::Left
}

/// Whether `candidate` beats `subject` in every event both have a row in.
///
/// Sharing no event at all is not enough. The store answers the same
/// question for every candidate at once in [`cubestat_db::nemeses_of`].
pub fn is_nemesis(candidate: &[ResultRecord], subject: &[ResultRecord]) -> bool {
    let theirs: HashMap<&str, &ResultRecord> = candidate
        .iter()
        .map(|r| (r.event_id.as_str(), r))
        .collect();
    let mut shared = 0;
    for mine in subject {
        if let Some(their) = theirs.get(mine.event_id.as_str()) {
            if !dominates(their, mine) {
                return false;
            }
            shared += 1;
        }
    }
    shared > 0
}

/// Nemeses within one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTally {
    pub scope: Scope,
    pub count: usize,
    /// Listed only when `count` is within the list limit.
    pub members: Option<Vec<Person>>,
}

impl ScopeTally {
    fn new(scope: Scope, members: Vec<Person>, list_limit: usize) -> Self {
        let count = members.len();
        Self {
            scope,
            count,
            members: (count <= list_limit).then_some(members),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NemesisReport {
    pub subject: Person,
    /// The scope the caller asked about.
    pub focus: Scope,
    pub world: ScopeTally,
    pub continent: ScopeTally,
    pub region: ScopeTally,
}

impl NemesisReport {
    pub fn tally(&self, scope: Scope) -> &ScopeTally {
        match scope {
            Scope::World => &self.world,
            Scope::Continent => &self.continent,
            Scope::Region => &self.region,
        }
    }

    pub fn focused(&self) -> &ScopeTally {
        self.tally(self.focus)
    }
}

/// Whether `other` falls inside `scope` as seen from `subject`.
///
/// Same country always counts as same continent, so each scope contains the
/// narrower ones.
pub fn in_scope(subject: &Person, other: &Person, scope: Scope) -> bool {
    let same_country = subject.country_id == other.country_id;
    match scope {
        Scope::World => true,
        Scope::Continent => {
            same_country
                || matches!(
                    (&subject.continent_id, &other.continent_id),
                    (Some(a), Some(b)) if a == b
                )
        }
        Scope::Region => same_country,
    }
}

/// Find everyone who dominates `subject` and tally them per scope.
pub fn find_nemeses(
    snapshot: &Snapshot,
    subject: &Person,
    focus: Scope,
    list_limit: usize,
) -> Result<NemesisReport, QueryError> {
    let nemeses = snapshot.with_conn(|conn| cubestat_db::nemeses_of(conn, &subject.wca_id))?;
    log::debug!("{} has {} nemeses worldwide", subject.wca_id, nemeses.len());

    let within = |scope: Scope| -> Vec<Person> {
        nemeses
            .iter()
            .filter(|p| in_scope(subject, p, scope))
            .cloned()
            .collect()
    };

    Ok(NemesisReport {
        subject: subject.clone(),
        focus,
        world: ScopeTally::new(Scope::World, within(Scope::World), list_limit),
        continent: ScopeTally::new(Scope::Continent, within(Scope::Continent), list_limit),
        region: ScopeTally::new(Scope::Region, within(Scope::Region), list_limit),
    })
}
