//! Query engine, refresh scheduling and the service facade for cubestat.

pub mod compare;
pub mod error;
pub mod nemesis;
pub mod query;
pub mod refresh;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod store;
pub mod upcoming;

pub use compare::{ComparisonReport, EventComparison, MetricOutcome, Score, compare, compare_records};
pub use error::{QueryError, RefreshError, ServiceError, SettingsError, StoreError, UpcomingError};
pub use nemesis::{NemesisReport, ScopeTally, dominates, find_nemeses, in_scope, is_nemesis};
pub use query::{PersonProfile, ResultLine, find_person, get_results, lookup};
pub use refresh::{ExportRefresher, RebuildSummary, RefreshOutcome};
pub use scheduler::{RefreshScheduler, Refresher};
pub use service::{ServiceStatus, StatsService};
pub use settings::{Settings, default_data_dir, settings_path};
pub use store::{EventCatalog, Snapshot, SnapshotInfo, StoreHandle};
pub use upcoming::{
    DEFAULT_COMPETITIONS_API, ListedCompetition, UpcomingGateway, filter_upcoming, listing_today,
};
