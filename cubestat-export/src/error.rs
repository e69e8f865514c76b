/// Errors from talking to the export endpoints.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Export endpoint returned HTTP {status} for {url}")]
    RemoteUnavailable { status: u16, url: String },

    #[error("Invalid export metadata: {0}")]
    InvalidResponse(String),

    #[error("Download truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether waiting for the next tick may clear the error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Truncated { .. } => true,
            Self::RemoteUnavailable { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Errors from reading tables out of an export archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive has no '{0}' table")]
    MissingTable(String),

    #[error("Table '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' line {line}: {message}")]
    Row {
        table: String,
        line: u64,
        message: String,
    },
}
