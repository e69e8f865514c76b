pub mod loader;
pub mod progress;

pub use loader::{CommitResult, ExportStamp, LoadError, LoadStats, Loader, REQUIRED_TABLES};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
