//! cubestat CLI
//!
//! Command-line interface for querying a local mirror of the WCA results
//! export and keeping it fresh.

mod cli_types;
mod commands;
mod error;
mod render;
mod spinner;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::{Level, LevelFilter};

use cubestat_lib::{Settings, StatsService, settings_path};

use cli_types::{Cli, Commands};
pub(crate) use error::CliError;

/// Print an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}

/// Install the logger. Normal output goes through `log::info!`, so info
/// lines print bare; `--verbose` adds timestamps and module paths.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("cubestat", level)
        .target(env_logger::Target::Stdout)
        .parse_default_env();

    if verbose {
        builder.format_timestamp_millis().format_module_path(true);
    } else {
        builder.format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            other => writeln!(buf, "{}: {}", other, record.args()),
        });
    }
    builder.init();
}

fn load_settings(config: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Settings, CliError> {
    let path = config.unwrap_or_else(settings_path);
    let mut settings = Settings::load(&path)?;
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    log::debug!(
        "Settings from {}, data in {}",
        path.display(),
        settings.data_dir.display()
    );
    Ok(settings)
}

async fn dispatch(command: Commands, settings: Settings, quiet: bool) -> Result<(), CliError> {
    let service = StatsService::open(settings)?;
    match command {
        Commands::Lookup { query } => commands::lookup::run_lookup(&service, &query).await,
        Commands::Pk { left, right } => commands::pk::run_pk(&service, &left, &right).await,
        Commands::Nemesis { query, scope } => {
            commands::nemesis::run_nemesis(&service, &query, scope).await
        }
        Commands::Refresh { force } => commands::refresh::run_refresh(&service, force, quiet).await,
        Commands::Upcoming { region, months } => {
            commands::upcoming::run_upcoming(&service, region.as_deref(), months).await
        }
        Commands::Status => {
            commands::status::run_status(&service);
            Ok(())
        }
        Commands::Serve => commands::serve::run_serve(&service).await,
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config, cli.data_dir)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;
    rt.block_on(dispatch(cli.command, settings, cli.quiet))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        match &e {
            CliError::Query(q) => commands::report_query_error(q),
            other => log::error!("{other}"),
        }
        std::process::exit(1);
    }
}
