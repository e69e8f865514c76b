//! Periodic and on-demand store refreshes.
//!
//! At most one refresh runs at a time. A trigger that arrives while one is in
//! flight is rejected with [`RefreshError::InProgress`] rather than queued.
//! The running refresh lives in its own task and owns the lock, so dropping
//! the caller's future never releases the lock early.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::RefreshError;
use crate::refresh::RefreshOutcome;

/// One refresh attempt: check, fetch, load, swap.
pub trait Refresher: Send + Sync + 'static {
    fn refresh(
        &self,
        force: bool,
    ) -> impl Future<Output = Result<RefreshOutcome, RefreshError>> + Send;
}

struct Inner<R> {
    refresher: R,
    lock: Arc<Mutex<()>>,
    interval: Duration,
    completed: AtomicU64,
}

pub struct RefreshScheduler<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for RefreshScheduler<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Refresher> RefreshScheduler<R> {
    pub fn new(refresher: R, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                refresher,
                lock: Arc::new(Mutex::new(())),
                interval,
                completed: AtomicU64::new(0),
            }),
        }
    }

    pub fn refresher(&self) -> &R {
        &self.inner.refresher
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Number of refreshes that rebuilt the store.
    pub fn completed_builds(&self) -> u64 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Whether a refresh is running right now.
    pub fn is_running(&self) -> bool {
        self.inner.lock.try_lock().is_err()
    }

    /// Run a forced refresh now, unless one is already running.
    pub async fn force_refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.trigger(true).await
    }

    /// Start a refresh, or fail with `InProgress` if one is running.
    pub async fn trigger(&self, force: bool) -> Result<RefreshOutcome, RefreshError> {
        let guard = self
            .inner
            .lock
            .clone()
            .try_lock_owned()
            .map_err(|_| RefreshError::InProgress)?;

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let result = inner.refresher.refresh(force).await;
            if let Ok(RefreshOutcome::Rebuilt(_)) = &result {
                inner.completed.fetch_add(1, Ordering::AcqRel);
            }
            result
        });
        task.await
            .map_err(|e| RefreshError::Task(e.to_string()))?
    }

    /// Start the background loop: one refresh immediately, then one per interval.
    pub fn spawn(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.inner.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                scheduler.run_tick().await;
            }
        })
    }

    async fn run_tick(&self) {
        match self.trigger(false).await {
            Ok(RefreshOutcome::Unchanged) => log::info!("Scheduled refresh: export unchanged"),
            Ok(RefreshOutcome::Rebuilt(summary)) => log::info!(
                "Scheduled refresh: loaded export {} ({} persons)",
                summary.export_date.as_deref().unwrap_or("unknown"),
                summary.persons
            ),
            Err(RefreshError::InProgress) => {
                log::info!("Scheduled refresh skipped: another refresh is running")
            }
            Err(e) => log::error!(
                "Scheduled refresh failed{}: {e}",
                if e.is_retryable() { " (will retry next tick)" } else { "" }
            ),
        }
    }
}
