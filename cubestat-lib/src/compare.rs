//! Head-to-head ("PK") comparison of two people.
//!
//! Every event where at least one side has a row is compared on single and
//! on average. A metric with no value on either side is skipped; otherwise a
//! finite value beats DNF or no value, the lower finite value wins, and equal
//! finite values (or no finite value at all) are even.

use std::collections::BTreeMap;

use cubestat_core::{Event, Mark, Metric, Person, ResultRecord, Verdict, judge};

use crate::error::QueryError;
use crate::query::{find_person, records};
use crate::store::{EventCatalog, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricOutcome {
    pub metric: Metric,
    pub left: Option<Mark>,
    pub right: Option<Mark>,
    pub verdict: Verdict,
}

impl MetricOutcome {
    fn new(metric: Metric, left: Option<&ResultRecord>, right: Option<&ResultRecord>) -> Self {
        let left = left.and_then(|r| r.mark(metric));
        let right = right.and_then(|r| r.mark(metric));
        Self {
            metric,
            left,
            right,
            verdict: judge(left, right),
        }
    }

    fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            verdict: self.verdict.flip(),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventComparison {
    pub event: Event,
    pub single: MetricOutcome,
    pub average: MetricOutcome,
}

/// Points per side. Skipped metrics count nowhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
    pub even: u32,
}

impl Score {
    fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Left => self.left += 1,
            Verdict::Right => self.right += 1,
            Verdict::Even => self.even += 1,
            Verdict::Skipped => {}
        }
    }

    pub fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            even: self.even,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    pub left: Person,
    pub right: Person,
    pub events: Vec<EventComparison>,
    pub score: Score,
}

impl ComparisonReport {
    /// The same comparison seen from the right-hand person.
    pub fn mirrored(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
            events: self
                .events
                .iter()
                .map(|e| EventComparison {
                    event: e.event.clone(),
                    single: e.single.mirrored(),
                    average: e.average.mirrored(),
                })
                .collect(),
            score: self.score.mirrored(),
        }
    }
}

/// Compare two sets of records event by event, in event display order.
pub fn compare_records(
    catalog: &EventCatalog,
    left: &[ResultRecord],
    right: &[ResultRecord],
) -> (Vec<EventComparison>, Score) {
    let mut by_event: BTreeMap<(i64, String), (Option<&ResultRecord>, Option<&ResultRecord>)> =
        BTreeMap::new();
    for r in left {
        let rank = catalog.resolve(&r.event_id).rank;
        by_event.entry((rank, r.event_id.clone())).or_default().0 = Some(r);
    }
    for r in right {
        let rank = catalog.resolve(&r.event_id).rank;
        by_event.entry((rank, r.event_id.clone())).or_default().1 = Some(r);
    }

    let mut score = Score::default();
    let events = by_event
        .into_iter()
        .map(|((_, event_id), (l, r))| {
            let single = MetricOutcome::new(Metric::Single, l, r);
            let average = MetricOutcome::new(Metric::Average, l, r);
            score.add(single.verdict);
            score.add(average.verdict);
            EventComparison {
                event: catalog.resolve(&event_id),
                single,
                average,
            }
        })
        .collect();
    (events, score)
}

/// Look up both people and compare them.
pub fn compare(snapshot: &Snapshot, left: &str, right: &str) -> Result<ComparisonReport, QueryError> {
    let left = find_person(snapshot, left)?;
    let right = find_person(snapshot, right)?;
    let left_records = records(snapshot, &left)?;
    let right_records = records(snapshot, &right)?;
    let (events, score) = compare_records(snapshot.events(), &left_records, &right_records);
    Ok(ComparisonReport {
        left,
        right,
        events,
        score,
    })
}
