use cubestat_lib::StatsService;

use crate::CliError;

/// Run the refresh scheduler until Ctrl-C.
pub(crate) async fn run_serve(service: &StatsService) -> Result<(), CliError> {
    let task = service.start_scheduler();
    log::info!("Serving; press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::runtime(format!("Failed to listen for Ctrl-C: {e}")))?;

    task.abort();
    let status = service.status();
    log::info!(
        "Stopped after {} rebuild(s){}",
        status.completed_builds,
        if status.refreshing { "; an in-flight refresh was abandoned" } else { "" }
    );
    Ok(())
}
