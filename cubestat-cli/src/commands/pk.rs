use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_core::{Metric, Verdict};
use cubestat_lib::StatsService;

use crate::CliError;
use crate::render::{self, pad};

pub(crate) async fn run_pk(service: &StatsService, left: &str, right: &str) -> Result<(), CliError> {
    let report = service.compare(left, right).await?;

    log::info!(
        "{}  vs  {}",
        render::person(&report.left),
        render::person(&report.right)
    );
    crate::log_blank();

    for e in &report.events {
        for outcome in [&e.single, &e.average] {
            if outcome.verdict == Verdict::Skipped {
                continue;
            }
            let metric = match outcome.metric {
                Metric::Single => "single",
                Metric::Average => "average",
            };
            log::info!(
                "{}{}{}{}",
                pad(&e.event.name, 22),
                pad(metric, 9),
                render::pk_cell(&e.event, outcome, true, 14),
                render::pk_cell(&e.event, outcome, false, 14).trim_end()
            );
        }
    }

    crate::log_blank();
    let score = report.score;
    let headline = format!("{} : {}", score.left, score.right);
    log::info!(
        "Score {} ({} even)",
        headline.if_supports_color(Stdout, |t| t.bold()),
        score.even
    );
    let verdict = match score.left.cmp(&score.right) {
        std::cmp::Ordering::Greater => format!("{} wins", report.left.name),
        std::cmp::Ordering::Less => format!("{} wins", report.right.name),
        std::cmp::Ordering::Equal => "Draw".to_string(),
    };
    log::info!("{}", verdict.if_supports_color(Stdout, |t| t.cyan()));
    Ok(())
}
