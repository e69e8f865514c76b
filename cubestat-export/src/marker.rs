//! Persisted record of the last committed export.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Marker format version. A marker written with another version is treated
/// as absent, which forces a fresh download.
pub const MARKER_VERSION: u32 = 1;

pub const MARKER_FILE: &str = "refresh-marker.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshMarker {
    #[serde(default)]
    pub version: u32,
    pub export_date: String,
    #[serde(default)]
    pub format_version: Option<String>,
    pub source_url: String,
    pub downloaded_at: String,
    pub file_size: u64,
}

impl RefreshMarker {
    /// True when `remote_date` is strictly later than this marker's export date.
    ///
    /// Dates are compared as RFC 3339 timestamps; if either side does not
    /// parse, any difference counts as newer.
    pub fn is_older_than(&self, remote_date: &str) -> bool {
        match (parse_date(&self.export_date), parse_date(remote_date)) {
            (Some(local), Some(remote)) => remote > local,
            _ => self.export_date.trim() != remote_date.trim(),
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILE)
}

/// Load the marker from `dir`. Missing or stale-format markers yield `None`.
pub fn load_marker(dir: &Path) -> Result<Option<RefreshMarker>, FetchError> {
    let path = marker_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    let marker: RefreshMarker = match serde_json::from_str(&contents) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("Ignoring unreadable refresh marker {}: {e}", path.display());
            return Ok(None);
        }
    };
    if marker.version != MARKER_VERSION {
        log::debug!(
            "Refresh marker version {} != {MARKER_VERSION}, treating as stale",
            marker.version
        );
        return Ok(None);
    }
    Ok(Some(marker))
}

/// Write the marker atomically (temp file, then rename).
pub fn save_marker(dir: &Path, marker: &RefreshMarker) -> Result<(), FetchError> {
    fs::create_dir_all(dir)?;
    let path = marker_path(dir);
    let tmp = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(marker)?;
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(date: &str) -> RefreshMarker {
        RefreshMarker {
            version: MARKER_VERSION,
            export_date: date.to_string(),
            format_version: Some("2.0.0".to_string()),
            source_url: "https://example.invalid/export.zip".to_string(),
            downloaded_at: "2026-10-01T03:00:00Z".to_string(),
            file_size: 42,
        }
    }

    #[test]
    fn later_date_is_newer() {
        let m = marker("2026-10-01T00:00:11Z");
        assert!(m.is_older_than("2026-10-02T00:00:11Z"));
        assert!(!m.is_older_than("2026-10-01T00:00:11Z"));
        assert!(!m.is_older_than("2026-09-30T00:00:00Z"));
    }

    #[test]
    fn offsets_are_respected() {
        let m = marker("2026-10-01T08:00:00+08:00");
        assert!(!m.is_older_than("2026-10-01T00:00:00Z"));
    }

    #[test]
    fn unparseable_dates_compare_by_text() {
        let m = marker("build-17");
        assert!(m.is_older_than("build-18"));
        assert!(!m.is_older_than("build-17"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_marker(dir.path()).unwrap(), None);
        let m = marker("2026-10-01T00:00:11Z");
        save_marker(dir.path(), &m).unwrap();
        assert_eq!(load_marker(dir.path()).unwrap(), Some(m));
    }

    #[test]
    fn other_marker_version_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = marker("2026-10-01T00:00:11Z");
        m.version = MARKER_VERSION + 1;
        save_marker(dir.path(), &m).unwrap();
        assert_eq!(load_marker(dir.path()).unwrap(), None);
    }
}
