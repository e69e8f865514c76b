use cubestat_lib::{QueryError, RefreshError, ServiceError, SettingsError, UpcomingError};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Settings could not be loaded
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// The service could not start
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Could not list competitions: {0}")]
    Upcoming(#[from] UpcomingError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
