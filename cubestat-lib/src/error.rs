use std::path::PathBuf;

use cubestat_core::Person;
use cubestat_db::{OperationError, SchemaError};
use cubestat_export::FetchError;
use cubestat_import::LoadError;
use thiserror::Error;

/// Errors opening or swapping store snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No store at {}", .0.display())]
    Missing(PathBuf),

    #[error("Store is unusable: {0}")]
    Schema(#[from] SchemaError),

    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

/// Errors answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No person matches '{0}'")]
    NotFound(String),

    #[error("'{query}' matches {} people", .candidates.len())]
    Ambiguous {
        query: String,
        candidates: Vec<Person>,
    },

    #[error("No results store is loaded yet")]
    NoStore,

    #[error("Database error: {0}")]
    Db(#[from] OperationError),

    #[error("Query task failed: {0}")]
    Task(String),
}

/// Errors from a refresh attempt.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Store swap failed: {0}")]
    Store(#[from] StoreError),

    #[error("A refresh is already in progress")]
    InProgress,

    #[error("Refresh task failed: {0}")]
    Task(String),
}

impl RefreshError {
    /// Whether the next scheduled tick may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::InProgress => true,
            Self::Load(_) | Self::Store(_) | Self::Task(_) => false,
        }
    }
}

/// Errors from the competition listing gateway.
#[derive(Debug, Error)]
pub enum UpcomingError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Listing endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Listing API error: {0}")]
    Api(String),

    #[error("Invalid listing response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

impl SettingsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Errors constructing the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upcoming(#[from] UpcomingError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
