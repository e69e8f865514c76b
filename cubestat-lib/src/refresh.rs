//! One refresh cycle: check the export, download it, rebuild the store and
//! swap the new snapshot in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cubestat_export::{Artifact, FetchOutcome, Fetcher};
use cubestat_import::{CommitResult, ExportStamp, LoadError, Loader, LogProgress};

use crate::error::RefreshError;
use crate::scheduler::Refresher;
use crate::store::StoreHandle;

/// What a finished rebuild produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub export_date: Option<String>,
    pub persons: u64,
    pub result_rows: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The loaded export is already current.
    Unchanged,
    Rebuilt(RebuildSummary),
}

/// Refreshes the store from the WCA export.
pub struct ExportRefresher {
    fetcher: Fetcher,
    loader: Loader,
    store: Arc<StoreHandle>,
}

impl ExportRefresher {
    pub fn new(fetcher: Fetcher, store: Arc<StoreHandle>) -> Self {
        let loader = Loader::new(store.path());
        Self {
            fetcher,
            loader,
            store,
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn store(&self) -> &Arc<StoreHandle> {
        &self.store
    }

    async fn run(&self, force: bool) -> Result<RefreshOutcome, RefreshError> {
        let force = force || !self.store.is_loaded();
        let artifact = match self.fetcher.check_and_fetch(force).await? {
            FetchOutcome::Unchanged => return Ok(RefreshOutcome::Unchanged),
            FetchOutcome::Updated(artifact) => artifact,
        };

        let result = self.load_and_swap(&artifact).await;
        self.fetcher.discard(&artifact);
        let commit = result?;

        self.fetcher.commit_marker(&artifact.marker)?;
        log::info!(
            "Refreshed store to export {} in {:.1}s",
            artifact.marker.export_date,
            commit.elapsed.as_secs_f64()
        );
        Ok(RefreshOutcome::Rebuilt(RebuildSummary {
            export_date: commit.export_date,
            persons: commit.stats.persons,
            result_rows: commit.stats.single_rows + commit.stats.average_rows,
            elapsed: commit.elapsed,
        }))
    }

    async fn load_and_swap(&self, artifact: &Artifact) -> Result<CommitResult, RefreshError> {
        let loader = self.loader.clone();
        let archive: PathBuf = artifact.path.clone();
        let stamp = ExportStamp {
            export_date: Some(artifact.info.export_date.clone()),
            format_version: artifact.info.export_format_version.clone(),
        };
        let commit = tokio::task::spawn_blocking(move || {
            loader.build_store(&archive, &stamp, Some(&LogProgress))
        })
        .await
        .map_err(|e| RefreshError::Task(e.to_string()))?
        .map_err(|e: LoadError| {
            log::error!("Load of export {} failed: {e}", artifact.info.export_date);
            RefreshError::from(e)
        })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.reload())
            .await
            .map_err(|e| RefreshError::Task(e.to_string()))??;
        Ok(commit)
    }
}

impl Refresher for ExportRefresher {
    async fn refresh(&self, force: bool) -> Result<RefreshOutcome, RefreshError> {
        self.run(force).await
    }
}
