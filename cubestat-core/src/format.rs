//! Human-readable rendering of raw result values.

use crate::types::{EventFormat, Mark, Metric};

/// Render a mark according to its event's encoding.
///
/// Times are centiseconds (`5.12`, `1:05.12`); move counts print as-is for
/// singles and with two decimals for averages; multi-blind values decode to
/// `solved/attempted time`.
pub fn format_mark(mark: Mark, format: EventFormat, metric: Metric) -> String {
    let value = match mark {
        Mark::Dnf => return "DNF".to_string(),
        Mark::Finite(v) => v,
    };
    match format {
        EventFormat::Time => format_centiseconds(value),
        EventFormat::Moves => match metric {
            Metric::Single => value.to_string(),
            Metric::Average => format!("{}.{:02}", value / 100, value % 100),
        },
        EventFormat::Multi => format_multi_blind(value),
    }
}

fn format_centiseconds(total: i64) -> String {
    let minutes = total / 6000;
    let seconds = (total % 6000) / 100;
    let cs = total % 100;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{cs:02}")
    } else {
        format!("{seconds}.{cs:02}")
    }
}

/// Decode a multi-blind value.
///
/// Current encoding is `0DDTTTTTMM` (DD = 99 - (solved - missed), TTTTT =
/// seconds, MM = missed); the legacy encoding is `1SSAATTTTT` (SS = 99 -
/// solved, AA = attempted). A time of 99999 means unknown.
pub fn format_multi_blind(value: i64) -> String {
    let (solved, attempted, seconds) = if value >= 1_000_000_000 {
        let ss = value / 10_000_000 % 100;
        let aa = value / 100_000 % 100;
        (99 - ss, aa, value % 100_000)
    } else {
        let dd = value / 10_000_000 % 100;
        let missed = value % 100;
        let solved = 99 - dd + missed;
        (solved, solved + missed, value / 100 % 100_000)
    };

    if seconds == 99_999 {
        return format!("{solved}/{attempted}");
    }

    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{solved}/{attempted} {hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{solved}/{attempted} {minutes}:{secs:02}")
    }
}
