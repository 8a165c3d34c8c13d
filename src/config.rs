//! Configuration types for the daily-line client.

use crate::error::{AppError, Result};
use crate::scheduler::day::DayBoundary;
use chrono::FixedOffset;
use daily_api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Offset of the backend's content day (Asia/Seoul, UTC+9) in minutes.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 9 * 60;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Day-rollover settings.
    pub schedule: ScheduleConfig,
    /// Share link settings.
    pub share: ShareConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Which clock defines "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundaryMode {
    /// A fixed UTC offset, independent of the host's timezone.
    #[default]
    Fixed,
    /// The host's local timezone.
    Local,
}

/// Day-rollover configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Day boundary policy.
    pub day_boundary: DayBoundaryMode,
    /// Offset used when `day_boundary = "fixed"`, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// How often the date watcher compares the loaded day against today.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_boundary: DayBoundaryMode::Fixed,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            poll_interval_secs: 60,
        }
    }
}

impl ScheduleConfig {
    /// Resolve the configured policy into a [`DayBoundary`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the offset is out of range.
    pub fn day_boundary(&self) -> Result<DayBoundary> {
        match self.day_boundary {
            DayBoundaryMode::Local => Ok(DayBoundary::Local),
            DayBoundaryMode::Fixed => FixedOffset::east_opt(self.utc_offset_minutes * 60)
                .filter(|_| (-12 * 60..=14 * 60).contains(&self.utc_offset_minutes))
                .map(DayBoundary::Fixed)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "utc_offset_minutes must be within -720..=840, got {}",
                        self.utc_offset_minutes
                    ))
                }),
        }
    }
}

/// Share link configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Public page URL that share links point at. Defaults to the API base URL.
    pub page_url: Option<String>,
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Write logs to a daily-rolling file instead of stderr.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "daily_line=info,daily_api=info".to_owned(),
            file_logging: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.api
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.schedule.day_boundary()?;
        if self.schedule.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }
        if let Some(page) = &self.share.page_url {
            url::Url::parse(page)
                .map_err(|e| AppError::Config(format!("invalid share.page_url '{page}': {e}")))?;
        }
        Ok(())
    }

    /// Page URL used when building share links.
    pub fn page_url(&self) -> String {
        self.share
            .page_url
            .clone()
            .unwrap_or_else(|| self.api.base_url.clone())
    }
}
