//! Export metadata checks and archive downloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;
use crate::marker::{self, MARKER_VERSION, RefreshMarker};

pub const DEFAULT_EXPORT_API: &str = "https://www.worldcubeassociation.org/api/v0/export/public";

const ARCHIVE_FILE: &str = "export.zip";
const PARTIAL_FILE: &str = "export.zip.part";

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Export metadata endpoint.
    pub api_url: String,
    /// Directory holding the marker and downloaded archive.
    pub work_dir: PathBuf,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
}

impl FetcherConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url: DEFAULT_EXPORT_API.to_string(),
            work_dir: work_dir.into(),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(600),
        }
    }
}

/// Response of the export metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportInfo {
    pub export_date: String,
    #[serde(default)]
    pub export_format_version: Option<String>,
    #[serde(default)]
    pub tsv_url: String,
    #[serde(default)]
    pub tsv_filesize_bytes: Option<u64>,
}

/// A downloaded archive waiting to be loaded.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub info: ExportInfo,
    /// Marker to persist once the archive has been loaded and committed.
    pub marker: RefreshMarker,
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Unchanged,
    Updated(Artifact),
}

/// Checks the export endpoint and downloads new archives.
pub struct Fetcher {
    http: reqwest::Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("cubestat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    /// Final location of a completed download.
    pub fn archive_path(&self) -> PathBuf {
        self.config.work_dir.join(ARCHIVE_FILE)
    }

    fn partial_path(&self) -> PathBuf {
        self.config.work_dir.join(PARTIAL_FILE)
    }

    /// Fetch the export metadata.
    pub async fn export_info(&self) -> Result<ExportInfo, FetchError> {
        let url = &self.config.api_url;
        log::debug!("Requesting export metadata from {url}");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::RemoteUnavailable {
                status: status.as_u16(),
                url: url.clone(),
            });
        }
        let text = resp.text().await?;
        let info: ExportInfo = serde_json::from_str(&text).map_err(|e| {
            FetchError::invalid_response(format!(
                "{e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })?;
        if info.tsv_url.trim().is_empty() {
            return Err(FetchError::invalid_response("metadata carries no tsv_url"));
        }
        Ok(info)
    }

    /// The marker of the last committed export, if any.
    pub fn current_marker(&self) -> Result<Option<RefreshMarker>, FetchError> {
        marker::load_marker(&self.config.work_dir)
    }

    /// Download the archive when the remote export is newer than the marker,
    /// or unconditionally when `force` is set.
    ///
    /// The marker is left untouched; call [`Fetcher::commit_marker`] with
    /// the artifact's marker once its contents have been committed.
    pub async fn check_and_fetch(&self, force: bool) -> Result<FetchOutcome, FetchError> {
        let info = self.export_info().await?;

        if !force {
            if let Some(current) = self.current_marker()? {
                if !current.is_older_than(&info.export_date) {
                    log::info!("Export {} is already loaded", info.export_date);
                    return Ok(FetchOutcome::Unchanged);
                }
                log::info!(
                    "New export available: {} (have {})",
                    info.export_date,
                    current.export_date
                );
            }
        }

        let file_size = self.download(&info).await?;
        let marker = RefreshMarker {
            version: MARKER_VERSION,
            export_date: info.export_date.clone(),
            format_version: info.export_format_version.clone(),
            source_url: info.tsv_url.clone(),
            downloaded_at: chrono::Utc::now().to_rfc3339(),
            file_size,
        };
        Ok(FetchOutcome::Updated(Artifact {
            path: self.archive_path(),
            info,
            marker,
        }))
    }

    /// Persist the marker of a committed export.
    pub fn commit_marker(&self, marker: &RefreshMarker) -> Result<(), FetchError> {
        marker::save_marker(&self.config.work_dir, marker)?;
        log::debug!("Refresh marker now at {}", marker.export_date);
        Ok(())
    }

    /// Remove a loaded archive from the work directory.
    pub fn discard(&self, artifact: &Artifact) {
        if let Err(e) = std::fs::remove_file(&artifact.path) {
            log::warn!("Could not remove {}: {e}", artifact.path.display());
        }
    }

    async fn download(&self, info: &ExportInfo) -> Result<u64, FetchError> {
        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let part = self.partial_path();

        log::info!("Downloading export {} from {}", info.export_date, info.tsv_url);
        let result = match self.download_to(&info.tsv_url, &part, info.tsv_filesize_bytes).await {
            Ok(size) => tokio::fs::rename(&part, self.archive_path())
                .await
                .map(|_| size)
                .map_err(FetchError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => {
                log::info!("Downloaded {:.2} MB", size as f64 / 1024.0 / 1024.0);
                Ok(size)
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&part).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        log::warn!("Could not remove partial download: {rm}");
                    }
                }
                Err(e)
            }
        }
    }

    async fn download_to(
        &self,
        url: &str,
        dest: &Path,
        expected: Option<u64>,
    ) -> Result<u64, FetchError> {
        let mut resp = self
            .http
            .get(url)
            .timeout(self.config.download_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::RemoteUnavailable {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let expected = expected.or_else(|| resp.content_length());

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        if let Some(expected) = expected {
            if written < expected {
                return Err(FetchError::Truncated {
                    expected,
                    actual: written,
                });
            }
        }
        Ok(written)
    }
}
