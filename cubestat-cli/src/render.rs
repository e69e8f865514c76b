//! Shared text rendering for command output.

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_core::{
    Competition, Event, Gender, Mark, Metric, Person, RankLabel, Scope, Verdict, format_mark,
};
use cubestat_lib::{MetricOutcome, ScopeTally};

/// A mark as text, or `-` when there is none.
pub(crate) fn mark(event: &Event, metric: Metric, value: Option<Mark>) -> String {
    value
        .map(|m| format_mark(m, event.format, metric))
        .unwrap_or_else(|| "-".to_string())
}

/// A rank label padded to `width`, highlighted by scope.
pub(crate) fn rank_cell(label: Option<RankLabel>, width: usize) -> String {
    let text = pad(&label.map(|l| l.to_string()).unwrap_or_default(), width);
    match label {
        Some(RankLabel::World(_)) => text.if_supports_color(Stdout, |t| t.red()).to_string(),
        Some(RankLabel::Continent(_)) => text.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        Some(RankLabel::National(_)) => text.if_supports_color(Stdout, |t| t.green()).to_string(),
        None => text,
    }
}

pub(crate) fn person(p: &Person) -> String {
    format!(
        "{} ({}, {})",
        p.name.if_supports_color(Stdout, |t| t.bold()),
        p.wca_id,
        p.country_id
    )
}

/// The line under a person's name: country and gender, whichever are known.
pub(crate) fn profile_details(country: Option<&str>, gender: Option<Gender>) -> Option<String> {
    let parts: Vec<&str> = country
        .into_iter()
        .chain(gender.map(Gender::label))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// One side of a PK line padded to `width`, highlighted when it won.
pub(crate) fn pk_cell(event: &Event, outcome: &MetricOutcome, left: bool, width: usize) -> String {
    let value = if left { outcome.left } else { outcome.right };
    let text = pad(&mark(event, outcome.metric, value), width);
    let won = matches!(
        (outcome.verdict, left),
        (Verdict::Left, true) | (Verdict::Right, false)
    );
    if won {
        text.if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        text
    }
}

pub(crate) fn tally(t: &ScopeTally) -> String {
    let label = match t.scope {
        Scope::World => "World",
        Scope::Continent => "Continent",
        Scope::Region => "Region",
    };
    format!("{label:<10} {:>6}", t.count)
}

pub(crate) fn date_range(c: &Competition) -> String {
    if c.start_date == c.end_date {
        c.start_date.format("%Y-%m-%d").to_string()
    } else {
        format!(
            "{} ~ {}",
            c.start_date.format("%Y-%m-%d"),
            c.end_date.format("%m-%d")
        )
    }
}

/// Pad `s` to `width` display columns. Wide (CJK) characters count twice.
pub(crate) fn pad(s: &str, width: usize) -> String {
    let used: usize = s
        .chars()
        .map(|c| if (c as u32) >= 0x1100 { 2 } else { 1 })
        .sum();
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}
