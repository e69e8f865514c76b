//! Committed store snapshots and the handle that swaps them.
//!
//! A [`Snapshot`] is one committed store file with a few read-only
//! connections, its country table and event catalog. Queries hold an
//! `Arc<Snapshot>` for their whole run; installing a new snapshot only swaps
//! the handle's pointer, and the old snapshot closes when its last reader
//! drops it. Open connections keep reading the file they were opened on even
//! after a rebuild renames a new file over it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use cubestat_core::{CountryTable, Event, EventFormat};
use cubestat_db::StoreStats;
use rusqlite::Connection;

use crate::error::StoreError;

// ── Event catalog ───────────────────────────────────────────────────────────

/// Events of one snapshot in display order.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    ordered: Vec<Event>,
    by_id: HashMap<String, usize>,
}

impl EventCatalog {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        let mut ordered: Vec<Event> = events.into_iter().collect();
        ordered.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
        let by_id = ordered
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self { ordered, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.by_id.get(id).map(|&i| &self.ordered[i])
    }

    /// The event for `id`, or a placeholder sorted after every known event.
    pub fn resolve(&self, id: &str) -> Event {
        self.get(id).cloned().unwrap_or_else(|| Event {
            id: id.to_string(),
            name: id.to_string(),
            rank: i64::MAX,
            format: EventFormat::Time,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

// ── Snapshot ────────────────────────────────────────────────────────────────

/// Facts about a loaded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub export_date: Option<String>,
    pub format_version: Option<String>,
    pub built_at: Option<String>,
    pub stats: StoreStats,
}

pub struct Snapshot {
    readers: Vec<Mutex<Connection>>,
    next: AtomicUsize,
    countries: CountryTable,
    events: EventCatalog,
    info: SnapshotInfo,
}

impl Snapshot {
    /// Open `readers` read-only connections on a committed store.
    pub fn open(path: &Path, readers: usize) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Missing(path.to_path_buf()));
        }
        let mut conns = Vec::with_capacity(readers.max(1));
        for _ in 0..readers.max(1) {
            conns.push(cubestat_db::open_readonly(path)?);
        }

        let first = &conns[0];
        let countries = CountryTable::new(cubestat_db::list_countries(first)?);
        let events = EventCatalog::new(cubestat_db::list_events(first)?);
        let mut meta = cubestat_db::metadata(first)?;
        let info = SnapshotInfo {
            path: path.to_path_buf(),
            export_date: meta.remove("export_date"),
            format_version: meta.remove("format_version"),
            built_at: meta.remove("built_at"),
            stats: cubestat_db::store_stats(first)?,
        };
        log::debug!(
            "Opened snapshot {} ({} persons, {} connections)",
            path.display(),
            info.stats.persons,
            conns.len()
        );

        Ok(Self {
            readers: conns.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
            countries,
            events,
            info,
        })
    }

    /// Run `f` on a free read connection, waiting for one if all are busy.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let n = self.readers.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % n;
        for offset in 0..n {
            if let Ok(conn) = self.readers[(start + offset) % n].try_lock() {
                return f(&*conn);
            }
        }
        let conn = self.readers[start]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&*conn)
    }

    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }

    pub fn events(&self) -> &EventCatalog {
        &self.events
    }

    pub fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }
}

// ── Handle ──────────────────────────────────────────────────────────────────

/// Shared pointer to the current snapshot of the store at a fixed path.
pub struct StoreHandle {
    path: PathBuf,
    readers: usize,
    current: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
}

impl StoreHandle {
    pub fn new(path: impl Into<PathBuf>, readers: usize) -> Self {
        Self {
            path: path.into(),
            readers: readers.max(1),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The snapshot queries should use, if one is loaded.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Number of snapshots installed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Make `snapshot` current. Readers of the previous one are unaffected.
    pub fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(snapshot.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(old) = previous {
            log::debug!(
                "Replaced snapshot (export {}), {} readers still hold it",
                old.info.export_date.as_deref().unwrap_or("unknown"),
                Arc::strong_count(&old) - 1
            );
        }
        snapshot
    }

    /// Open the committed file at the handle's path and install it.
    ///
    /// Blocking.
    pub fn reload(&self) -> Result<Arc<Snapshot>, StoreError> {
        let snapshot = Snapshot::open(&self.path, self.readers)?;
        Ok(self.install(snapshot))
    }

    /// Install the existing store file, if there is a usable one.
    ///
    /// An unusable file is logged and left for the next refresh to replace.
    pub fn open_existing(&self) -> Option<Arc<Snapshot>> {
        if !self.path.exists() {
            log::info!("No store at {} yet", self.path.display());
            return None;
        }
        match self.reload() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Existing store {} is unusable: {e}", self.path.display());
                None
            }
        }
    }
}
