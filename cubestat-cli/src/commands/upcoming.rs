use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_lib::StatsService;

use crate::CliError;
use crate::render;

pub(crate) async fn run_upcoming(
    service: &StatsService,
    region: Option<&str>,
    months: Option<u32>,
) -> Result<(), CliError> {
    let competitions = service.upcoming(region, months).await?;
    let region = region.unwrap_or(&service.settings().upcoming_region);
    let months = months.unwrap_or(service.settings().upcoming_window_months);

    if competitions.is_empty() {
        log::info!("No competitions in {region} in the next {months} months.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!(
            "Upcoming competitions in {region} ({})",
            competitions.len()
        )
        .if_supports_color(Stdout, |t| t.bold())
    );
    crate::log_blank();
    for (i, c) in competitions.iter().enumerate() {
        let place = [c.province.as_str(), c.city.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if place.is_empty() {
            log::info!("{:>3}. {}", i + 1, c.name);
        } else {
            log::info!(
                "{:>3}. {} [{}]",
                i + 1,
                c.name,
                place.if_supports_color(Stdout, |t| t.cyan())
            );
        }
        log::info!("     {}", render::date_range(c));
    }
    Ok(())
}
