//! Viewer configuration for the trialview CLI.
//!
//! Settings live in a small JSON file, by default
//! `~/.config/trialview/config.json`. The location can be overridden with
//! [`CONFIG_PATH_ENV`]. A missing file yields defaults; a malformed file is
//! reported with a warning and also yields defaults.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "TRIALVIEW_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_WATCH_INTERVAL_MS: u64 = 2_000;

/// Error surfaced when the config file exists but cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persisted viewer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding one sub-directory per trial. Supports `~`.
    pub trials_root: Option<String>,
    /// Upper bound for a single artifact fetch; `0` disables the bound.
    pub fetch_timeout_ms: u64,
    /// How long `show` waits for outstanding artifact fetches.
    pub settle_timeout_ms: u64,
    /// Poll interval for `watch`.
    pub watch_interval_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            trials_root: None,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

impl ViewerConfig {
    /// Load from the default location (honouring [`CONFIG_PATH_ENV`]).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse config file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    /// Trials root with `~` expanded.
    pub fn trials_root(&self) -> Option<PathBuf> {
        self.trials_root
            .as_deref()
            .map(str::trim)
            .filter(|root| !root.is_empty())
            .map(expand_tilde)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms.max(1))
    }
}

/// Resolve the config file path, preferring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trialview")
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ViewerConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ViewerConfig::load_from_path(&path).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"trials_root": "/srv/trials", "fetch_timeout_ms": 0}"#).unwrap();

        let config = ViewerConfig::load_from_path(&path).unwrap();
        assert_eq!(config.trials_root(), Some(PathBuf::from("/srv/trials")));
        assert_eq!(config.fetch_timeout(), None);
        assert_eq!(config.watch_interval_ms, DEFAULT_WATCH_INTERVAL_MS);
    }

    #[test]
    fn full_file_overrides_every_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"trials_root": "/data", "fetch_timeout_ms": 250, "settle_timeout_ms": 500, "watch_interval_ms": 100}"#,
        )
        .unwrap();

        let config = ViewerConfig::load_from_path(&path).unwrap();
        assert_eq!(
            config,
            ViewerConfig {
                trials_root: Some("/data".into()),
                fetch_timeout_ms: 250,
                settle_timeout_ms: 500,
                watch_interval_ms: 100,
            }
        );
        assert_eq!(config.settle_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(ViewerConfig::load_from_path(dir.path()), Err(ConfigError::Io(_))));
    }

    #[test]
    fn default_path_honors_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/trialview/custom.json"), || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/trialview/custom.json"));
        });
    }

    #[test]
    fn blank_trials_root_is_ignored() {
        let config = ViewerConfig {
            trials_root: Some("   ".into()),
            ..ViewerConfig::default()
        };
        assert_eq!(config.trials_root(), None);
    }
}
