//! Core domain types shared by every cubestat crate.
//!
//! Persons, events, marks, rankings, scopes and competitions, plus the
//! country → continent table and the text formatting of result values.

pub mod continent;
pub mod format;
pub mod scope;
pub mod types;

pub use continent::{Country, CountryTable, fallback_continent};
pub use format::{format_mark, format_multi_blind};
pub use scope::{Scope, ScopeParseError};
pub use types::{
    Competition, Event, EventFormat, Gender, Mark, Metric, Person, RankLabel, Ranks, ResultRecord,
    Verdict, judge, split_name,
};
