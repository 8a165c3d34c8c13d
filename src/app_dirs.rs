//! Centralized application directory paths for daily-line.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/daily-line/` | `~/.local/share/daily-line/` |
//! | Config | `~/Library/Application Support/daily-line/` | `~/.config/daily-line/` |
//!
//! # Environment Overrides
//!
//! - `DAILY_LINE_DATA_DIR` overrides [`data_dir`]
//! - `DAILY_LINE_CONFIG_DIR` overrides [`config_dir`]

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "daily-line";

/// Application data root directory.
///
/// Holds the persisted client identifier and log files.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("DAILY_LINE_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/daily-line-data",
    )
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("DAILY_LINE_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/daily-line-config",
    )
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Persisted client identifier (`data_dir()/user_id`).
#[must_use]
pub fn identity_file() -> PathBuf {
    data_dir().join("user_id")
}

fn resolve(override_dir: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let dir = resolve(
            Some(OsString::from("/srv/line")),
            Some(PathBuf::from("/home/a/.local/share")),
            "/tmp/x",
        );
        assert_eq!(dir, PathBuf::from("/srv/line"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let dir = resolve(
            Some(OsString::new()),
            Some(PathBuf::from("/home/a/.config")),
            "/tmp/x",
        );
        assert_eq!(dir, PathBuf::from("/home/a/.config/daily-line"));
    }

    #[test]
    fn fallback_when_platform_dir_missing() {
        let dir = resolve(None, None, "/tmp/daily-line-data");
        assert_eq!(dir, PathBuf::from("/tmp/daily-line-data"));
    }

    #[test]
    fn config_file_ends_with_config_toml() {
        let path = config_file();
        let s = path.to_string_lossy();
        assert!(s.ends_with("config.toml"), "config_file: {s}");
    }

    #[test]
    fn logs_and_identity_live_under_data_dir() {
        let data = data_dir();
        assert!(logs_dir().starts_with(&data));
        assert!(identity_file().starts_with(&data));
        assert_eq!(
            identity_file().file_name().and_then(|n| n.to_str()),
            Some("user_id")
        );
    }
}
