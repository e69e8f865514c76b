//! Application settings.
//!
//! Read from `~/.config/cubestat/settings.toml` unless another path is given.
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cubestat_export::{DEFAULT_EXPORT_API, FetcherConfig};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::upcoming::DEFAULT_COMPETITIONS_API;

const STORE_FILE: &str = "wca.db";

/// Canonical path to the settings file: `~/.config/cubestat/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("cubestat").join("settings.toml")
}

/// Default data directory: `~/.local/share/cubestat` or the platform equivalent.
pub fn default_data_dir() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("cubestat")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Holds the store, the refresh marker and transient downloads.
    pub data_dir: PathBuf,
    pub refresh_interval_hours: u64,
    pub upcoming_window_months: u32,
    pub upcoming_region: String,
    /// Highest rank position worth showing next to a result.
    pub rank_display_cap: u32,
    /// Nemesis tallies list their members up to this count.
    pub nemesis_list_limit: usize,
    pub export_api_url: String,
    pub competitions_api_url: String,
    pub request_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub upcoming_cache_minutes: u64,
    /// Read connections per snapshot.
    pub reader_connections: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            refresh_interval_hours: 12,
            upcoming_window_months: 6,
            upcoming_region: "China".to_string(),
            rank_display_cap: 200,
            nemesis_list_limit: 5,
            export_api_url: DEFAULT_EXPORT_API.to_string(),
            competitions_api_url: DEFAULT_COMPETITIONS_API.to_string(),
            request_timeout_secs: 30,
            download_timeout_secs: 600,
            upcoming_cache_minutes: 30,
            reader_connections: 4,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.refresh_interval_hours == 0 {
            return Err(SettingsError::invalid("refresh_interval_hours must be at least 1"));
        }
        if self.reader_connections == 0 {
            return Err(SettingsError::invalid("reader_connections must be at least 1"));
        }
        if self.request_timeout_secs == 0 || self.download_timeout_secs == 0 {
            return Err(SettingsError::invalid("timeouts must be at least 1 second"));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours * 3600)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upcoming_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.upcoming_cache_minutes * 60)
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            api_url: self.export_api_url.clone(),
            work_dir: self.data_dir.clone(),
            request_timeout: self.request_timeout(),
            download_timeout: Duration::from_secs(self.download_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings.refresh_interval_hours, 12);
        assert_eq!(settings.rank_display_cap, 200);
        assert_eq!(settings.nemesis_list_limit, 5);
        assert_eq!(settings.upcoming_region, "China");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "refresh_interval_hours = 6\ndata_dir = \"/srv/cubestat\"\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(6 * 3600));
        assert_eq!(settings.store_path(), PathBuf::from("/srv/cubestat/wca.db"));
        assert_eq!(settings.upcoming_window_months, 6);
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.nemesis_list_limit = 10;
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "refresh_interval_hours = 0\n").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Invalid(_))));
    }
}
