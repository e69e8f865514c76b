//! Results export access: freshness checks, downloads and archive reading.

pub mod archive;
pub mod error;
pub mod fetcher;
pub mod marker;

pub use archive::{ArchiveMetadata, ExportArchive, TsvRow, TsvTable, normalize_name};
pub use error::{ArchiveError, FetchError};
pub use fetcher::{Artifact, DEFAULT_EXPORT_API, ExportInfo, FetchOutcome, Fetcher, FetcherConfig};
pub use marker::{MARKER_FILE, MARKER_VERSION, RefreshMarker, load_marker, save_marker};
