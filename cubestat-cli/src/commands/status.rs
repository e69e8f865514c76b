use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_lib::StatsService;

pub(crate) fn run_status(service: &StatsService) {
    let status = service.status();

    log::info!("{}", "cubestat status".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Store:     {}", status.store_path.display());
    match &status.snapshot {
        Some(info) => {
            log::info!(
                "  Export:    {}",
                info.export_date.as_deref().unwrap_or("(undated)")
            );
            if let Some(version) = &info.format_version {
                log::info!("  Format:    {version}");
            }
            if let Some(built) = &info.built_at {
                log::info!("  Built:     {built}");
            }
            crate::log_blank();
            log::info!("  Persons:   {:>10}", info.stats.persons);
            log::info!("  Events:    {:>10}", info.stats.events);
            log::info!("  Countries: {:>10}", info.stats.countries);
            log::info!("  Results:   {:>10}", info.stats.results);
        }
        None => {
            log::info!(
                "  Export:    {}",
                "not loaded".if_supports_color(Stdout, |t| t.yellow())
            );
            log::info!("Run 'cubestat refresh' to build the store.");
        }
    }

    crate::log_blank();
    match &status.marker {
        Some(marker) => log::info!(
            "  Marker:    {} (downloaded {})",
            marker.export_date,
            marker.downloaded_at
        ),
        None => log::info!("  Marker:    none"),
    }
}
