//! The service facade every front end talks to.
//!
//! Owns the store handle, the refresh scheduler and the listing gateway.
//! Queries run on blocking workers against the snapshot current when they
//! start.

use std::path::PathBuf;
use std::sync::Arc;

use cubestat_core::{Competition, Scope};
use cubestat_export::{Fetcher, RefreshMarker};
use tokio::task::JoinHandle;

use crate::compare::{self, ComparisonReport};
use crate::error::{QueryError, RefreshError, ServiceError, UpcomingError};
use crate::nemesis::{self, NemesisReport};
use crate::query::{self, PersonProfile};
use crate::refresh::{ExportRefresher, RefreshOutcome};
use crate::scheduler::RefreshScheduler;
use crate::settings::Settings;
use crate::store::{Snapshot, SnapshotInfo, StoreHandle};
use crate::upcoming::UpcomingGateway;

/// What `status` reports.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub store_path: PathBuf,
    pub snapshot: Option<SnapshotInfo>,
    pub marker: Option<RefreshMarker>,
    pub completed_builds: u64,
    pub refreshing: bool,
}

pub struct StatsService {
    settings: Settings,
    store: Arc<StoreHandle>,
    scheduler: RefreshScheduler<ExportRefresher>,
    upcoming: UpcomingGateway,
}

impl StatsService {
    /// Build the service and load the existing store, if any.
    ///
    /// A missing or unusable store is not an error; queries report
    /// [`QueryError::NoStore`] until the first refresh commits one.
    pub fn open(settings: Settings) -> Result<Self, ServiceError> {
        settings.validate()?;
        let store = Arc::new(StoreHandle::new(
            settings.store_path(),
            settings.reader_connections,
        ));
        store.open_existing();

        let fetcher = Fetcher::new(settings.fetcher_config())?;
        let refresher = ExportRefresher::new(fetcher, store.clone());
        let scheduler = RefreshScheduler::new(refresher, settings.refresh_interval());
        let upcoming = UpcomingGateway::new(
            settings.competitions_api_url.clone(),
            settings.request_timeout(),
            settings.upcoming_cache_ttl(),
        )?;

        Ok(Self {
            settings,
            store,
            scheduler,
            upcoming,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<StoreHandle> {
        &self.store
    }

    pub fn scheduler(&self) -> &RefreshScheduler<ExportRefresher> {
        &self.scheduler
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, QueryError> {
        self.store.current().ok_or(QueryError::NoStore)
    }

    async fn with_snapshot<T, F>(&self, f: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&Snapshot) -> Result<T, QueryError> + Send + 'static,
    {
        let snapshot = self.snapshot()?;
        tokio::task::spawn_blocking(move || f(&snapshot))
            .await
            .map_err(|e| QueryError::Task(e.to_string()))?
    }

    /// A person's profile and results.
    pub async fn lookup(&self, query: &str) -> Result<PersonProfile, QueryError> {
        let needle = query.to_string();
        let cap = self.settings.rank_display_cap;
        self.with_snapshot(move |s| query::lookup(s, &needle, cap)).await
    }

    /// Head-to-head comparison of two people.
    pub async fn compare(&self, left: &str, right: &str) -> Result<ComparisonReport, QueryError> {
        let (left, right) = (left.to_string(), right.to_string());
        self.with_snapshot(move |s| compare::compare(s, &left, &right))
            .await
    }

    /// Nemesis tallies for a person, focused on `scope`.
    pub async fn nemesis(&self, query: &str, scope: Scope) -> Result<NemesisReport, QueryError> {
        let needle = query.to_string();
        let limit = self.settings.nemesis_list_limit;
        self.with_snapshot(move |s| {
            let subject = query::find_person(s, &needle)?;
            nemesis::find_nemeses(s, &subject, scope, limit)
        })
        .await
    }

    /// Refresh now regardless of the marker.
    pub async fn force_refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.scheduler.force_refresh().await
    }

    /// Refresh only if the remote export is newer, or no store is loaded.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.scheduler.trigger(false).await
    }

    /// Upcoming competitions, defaulting to the configured region and window.
    pub async fn upcoming(
        &self,
        region: Option<&str>,
        months: Option<u32>,
    ) -> Result<Vec<Competition>, UpcomingError> {
        let region = region.unwrap_or(&self.settings.upcoming_region);
        let months = months.unwrap_or(self.settings.upcoming_window_months);
        self.upcoming.list_upcoming(region, months).await
    }

    pub fn status(&self) -> ServiceStatus {
        let marker = match self.scheduler.refresher().fetcher().current_marker() {
            Ok(marker) => marker,
            Err(e) => {
                log::warn!("Could not read refresh marker: {e}");
                None
            }
        };
        ServiceStatus {
            store_path: self.store.path().to_path_buf(),
            snapshot: self.store.current().map(|s| s.info().clone()),
            marker,
            completed_builds: self.scheduler.completed_builds(),
            refreshing: self.scheduler.is_running(),
        }
    }

    /// Start periodic refreshes. The first one runs immediately.
    pub fn start_scheduler(&self) -> JoinHandle<()> {
        log::info!(
            "Refreshing every {}h into {}",
            self.settings.refresh_interval_hours,
            self.store.path().display()
        );
        self.scheduler.spawn()
    }
}
