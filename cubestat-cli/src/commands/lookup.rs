use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_core::Metric;
use cubestat_lib::StatsService;

use crate::CliError;
use crate::render::{self, pad};

pub(crate) async fn run_lookup(service: &StatsService, query: &str) -> Result<(), CliError> {
    let profile = service.lookup(query).await?;
    let p = &profile.person;

    log::info!("{}", render::person(p));
    if let Some(details) = render::profile_details(profile.country_name.as_deref(), p.gender) {
        log::info!("  {details}");
    }
    crate::log_blank();

    if profile.results.is_empty() {
        log::info!("No results.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!(
            "{}{}{}",
            pad("Event", 22),
            pad("Single", 18),
            "Average"
        )
        .if_supports_color(Stdout, |t| t.bold())
    );
    for line in &profile.results {
        log::info!(
            "{}{}{}{}{}",
            pad(&line.event.name, 22),
            pad(&render::mark(&line.event, Metric::Single, line.single), 10),
            render::rank_cell(line.single_label, 8),
            pad(&render::mark(&line.event, Metric::Average, line.average), 10),
            render::rank_cell(line.average_label, 8).trim_end()
        );
    }
    Ok(())
}
