use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cubestat_lib::{RefreshOutcome, StatsService};

use crate::CliError;
use crate::spinner::Spinner;

pub(crate) async fn run_refresh(service: &StatsService, force: bool, quiet: bool) -> Result<(), CliError> {
    let spinner = Spinner::start(
        if force {
            "Rebuilding from the latest export..."
        } else {
            "Checking for a new export..."
        },
        quiet,
    );
    let outcome = if force {
        service.force_refresh().await
    } else {
        service.refresh().await
    };
    spinner.finish();

    match outcome? {
        RefreshOutcome::Unchanged => {
            log::info!(
                "{} Store is already on the latest export",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
        }
        RefreshOutcome::Rebuilt(summary) => {
            log::info!(
                "{} Loaded export {}: {} persons, {} result rows in {:.1}s",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                summary.export_date.as_deref().unwrap_or("(undated)"),
                summary.persons,
                summary.result_rows,
                summary.elapsed.as_secs_f64(),
            );
        }
    }
    Ok(())
}
