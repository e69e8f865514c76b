//! Data model types for the results mirror.
//!
//! These mirror the normalized store schema: persons, events and one
//! result record per (person, event) pair.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Person ──────────────────────────────────────────────────────────────────

/// A competitor as recorded in one export snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable WCA identifier, e.g. `2010ZHAN01`.
    pub wca_id: String,
    /// Display name, possibly with a local-script part in parentheses.
    pub name: String,
    pub country_id: String,
    /// Derived from the country at load time. `None` when the country is unknown.
    pub continent_id: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Gender as the persons table records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse the `gender` column. Empty or unrecognized values give `None`.
    pub fn from_export(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" => Some(Self::Male),
            "f" => Some(Self::Female),
            "o" => Some(Self::Other),
            _ => None,
        }
    }

    /// The one-letter code stored in the export and the store.
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
            Self::Other => "o",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// Split a display name into its latin part and optional local-script part.
///
/// `"Yiheng Wang (王艺衡)"` → `("Yiheng Wang", Some("王艺衡"))`.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim();
    let Some(stripped) = trimmed.strip_suffix(')') else {
        return (trimmed, None);
    };
    match stripped.rfind(" (") {
        Some(open) if open + 2 < stripped.len() => (&stripped[..open], Some(&stripped[open + 2..])),
        _ => (trimmed, None),
    }
}

// ── Event ───────────────────────────────────────────────────────────────────

/// How an event's raw values are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFormat {
    /// Centiseconds.
    Time,
    /// Move count; averages are stored multiplied by 100.
    Moves,
    /// Multi-blind packed encoding.
    Multi,
}

impl EventFormat {
    /// Parse the `format` column of the events table. Unknown values fall back to `Time`.
    pub fn from_export(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "number" => Self::Moves,
            "multi" => Self::Multi,
            _ => Self::Time,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Moves => "number",
            Self::Multi => "multi",
        }
    }
}

/// A discipline such as `333` or `333fm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Display order within the export.
    pub rank: i64,
    pub format: EventFormat,
}

// ── Marks ───────────────────────────────────────────────────────────────────

/// A single metric value. Lower finite values are better; `Dnf` ranks
/// behind every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Finite(i64),
    Dnf,
}

impl Mark {
    /// Decode a raw export value. `0` means no result; `-1` (DNF) and `-2`
    /// (DNS) both decode to `Dnf`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => None,
            r if r > 0 => Some(Self::Finite(r)),
            _ => Some(Self::Dnf),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Self::Finite(v) => v,
            Self::Dnf => -1,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    pub fn finite(self) -> Option<i64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Dnf => None,
        }
    }
}

impl Ord for Mark {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a.cmp(b),
            (Self::Finite(_), Self::Dnf) => Ordering::Less,
            (Self::Dnf, Self::Finite(_)) => Ordering::Greater,
            (Self::Dnf, Self::Dnf) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Mark {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Which per-event metric a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Single,
    Average,
}

/// Result of comparing two optional marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Left,
    Right,
    /// Equal finite values, or neither side finite.
    Even,
    /// Neither side has a value at all.
    Skipped,
}

impl Verdict {
    /// The same verdict seen from the other side.
    pub fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            other => other,
        }
    }
}

/// Compare two optional marks. Only a finite value can win.
pub fn judge(left: Option<Mark>, right: Option<Mark>) -> Verdict {
    let l = left.and_then(Mark::finite);
    let r = right.and_then(Mark::finite);
    match (l, r) {
        (Some(a), Some(b)) => match a.cmp(&b) {
            Ordering::Less => Verdict::Left,
            Ordering::Greater => Verdict::Right,
            Ordering::Equal => Verdict::Even,
        },
        (Some(_), None) => Verdict::Left,
        (None, Some(_)) => Verdict::Right,
        (None, None) if left.is_none() && right.is_none() => Verdict::Skipped,
        (None, None) => Verdict::Even,
    }
}

// ── Rankings ────────────────────────────────────────────────────────────────

/// Ranking positions for one metric. Positions are 1-based; `None` means
/// the export carried no position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranks {
    pub world: Option<u32>,
    pub continent: Option<u32>,
    pub country: Option<u32>,
}

impl Ranks {
    /// Pick the widest-scope rank within `cap`: world, then continent, then country.
    pub fn label(&self, cap: u32) -> Option<RankLabel> {
        let within = |r: Option<u32>| r.filter(|&p| p > 0 && p <= cap);
        if let Some(p) = within(self.world) {
            Some(RankLabel::World(p))
        } else if let Some(p) = within(self.continent) {
            Some(RankLabel::Continent(p))
        } else {
            within(self.country).map(RankLabel::National)
        }
    }

    /// The record held, if any. Rank 1 at a scope is that scope's record.
    pub fn record(&self) -> Option<RankLabel> {
        self.label(1)
    }
}

/// A displayable rank position, e.g. `WR12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankLabel {
    World(u32),
    Continent(u32),
    National(u32),
}

impl fmt::Display for RankLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World(p) => write!(f, "WR{p}"),
            Self::Continent(p) => write!(f, "CR{p}"),
            Self::National(p) => write!(f, "NR{p}"),
        }
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

/// A person's best single and average in one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub person_id: String,
    pub event_id: String,
    pub single: Option<Mark>,
    pub average: Option<Mark>,
    #[serde(default)]
    pub single_ranks: Ranks,
    #[serde(default)]
    pub average_ranks: Ranks,
}

impl ResultRecord {
    pub fn new(person_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            event_id: event_id.into(),
            single: None,
            average: None,
            single_ranks: Ranks::default(),
            average_ranks: Ranks::default(),
        }
    }

    pub fn with_single(mut self, mark: Mark) -> Self {
        self.single = Some(mark);
        self
    }

    pub fn with_average(mut self, mark: Mark) -> Self {
        self.average = Some(mark);
        self
    }

    pub fn mark(&self, metric: Metric) -> Option<Mark> {
        match metric {
            Metric::Single => self.single,
            Metric::Average => self.average,
        }
    }

    pub fn ranks(&self, metric: Metric) -> Ranks {
        match metric {
            Metric::Single => self.single_ranks,
            Metric::Average => self.average_ranks,
        }
    }
}

// ── Competition ─────────────────────────────────────────────────────────────

/// An upcoming competition from the listing API. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub city: String,
    pub province: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
