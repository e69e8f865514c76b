use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_core::Scope;
use cubestat_lib::StatsService;

use crate::CliError;
use crate::render;

pub(crate) async fn run_nemesis(
    service: &StatsService,
    query: &str,
    scope: Scope,
) -> Result<(), CliError> {
    let report = service.nemesis(query, scope).await?;

    log::info!("Nemeses of {}", render::person(&report.subject));
    crate::log_blank();
    for s in Scope::ALL {
        let line = render::tally(report.tally(s));
        if s == report.focus {
            log::info!("{}", line.if_supports_color(Stdout, |t| t.bold()));
        } else {
            log::info!("{line}");
        }
    }

    let focused = report.focused();
    crate::log_blank();
    match &focused.members {
        Some(members) if members.is_empty() => {
            log::info!("Nobody beats them in every shared event ({}).", focused.scope);
        }
        Some(members) => {
            for p in members {
                log::info!("  {}", render::person(p));
            }
        }
        None => log::info!(
            "{} nemeses ({}), too many to list.",
            focused.count,
            focused.scope
        ),
    }
    Ok(())
}
