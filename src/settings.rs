use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::correlate::CorrelationConfig;
use crate::error::{ContextError, Result};
use crate::tracker::DEFAULT_EVENT_LIMIT;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const DATA_DIR_ENV: &str = "AW_CONTEXT_DIR";
pub const TRACKER_URL_ENV: &str = "AW_CONTEXT_TRACKER_URL";
pub const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_DIR_NAME: &str = ".aw-context";
const DEFAULT_TRACKER_URL: &str = "http://localhost:5600";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub url: String,
    pub request_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub event_limit: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRACKER_URL.into(),
            request_timeout_secs: 30,
            query_timeout_secs: 60,
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl TrackerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationSettings {
    pub window_minutes: u32,
    pub top_apps: usize,
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        let defaults = CorrelationConfig::default();
        Self {
            window_minutes: defaults.window_minutes,
            top_apps: defaults.top_apps,
        }
    }
}

/// Contents of `settings.json`; every field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct FileSettings {
    tracker: TrackerSettings,
    correlation: CorrelationSettings,
}

/// Explicit values from the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub tracker_url: Option<String>,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub tracker: TrackerSettings,
    pub correlation: CorrelationSettings,
}

impl Settings {
    /// Resolves defaults, then `settings.json` in the data directory, then the
    /// environment, then `overrides`.
    pub fn load(overrides: Overrides) -> Result<Self> {
        Self::resolve(overrides, |key| env::var(key).ok(), dirs::home_dir())
    }

    fn resolve(
        overrides: Overrides,
        env_var: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = match overrides
            .data_dir
            .or_else(|| env_var(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        {
            Some(dir) => dir,
            None => home
                .map(|home| home.join(DEFAULT_DIR_NAME))
                .ok_or_else(|| {
                    ContextError::io(
                        "failed to resolve the context directory",
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "home directory is unknown",
                        ),
                    )
                })?,
        };

        let file = read_file_settings(&data_dir.join(SETTINGS_FILE))?;
        let mut settings = Settings {
            data_dir,
            tracker: file.tracker,
            correlation: file.correlation,
        };

        if let Some(url) = env_var(TRACKER_URL_ENV).filter(|v| !v.trim().is_empty()) {
            settings.tracker.url = url;
        }
        if let Some(url) = overrides.tracker_url {
            settings.tracker.url = url;
        }

        Ok(settings)
    }

    pub fn correlation_config(&self) -> CorrelationConfig {
        CorrelationConfig {
            window_minutes: self.correlation.window_minutes,
            top_apps: self.correlation.top_apps,
        }
    }
}

fn read_file_settings(path: &Path) -> Result<FileSettings> {
    if !path.exists() {
        return Ok(FileSettings::default());
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        ContextError::io(format!("failed to read settings from {}", path.display()), err)
    })?;

    Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
        log_warn!("ignoring unparsable settings {}: {err}", path.display());
        FileSettings::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_live_under_home() {
        let home = tempdir().unwrap();
        let settings =
            Settings::resolve(Overrides::default(), env_of(&[]), Some(home.path().into())).unwrap();

        assert_eq!(settings.data_dir, home.path().join(".aw-context"));
        assert_eq!(settings.tracker.url, "http://localhost:5600");
        assert_eq!(settings.tracker.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.tracker.query_timeout(), Duration::from_secs(60));
        assert_eq!(settings.tracker.event_limit, 1000);
        assert_eq!(settings.correlation_config(), CorrelationConfig::default());
    }

    #[test]
    fn file_then_env_then_flags() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"tracker": {"url": "http://file:1", "event_limit": 50}, "correlation": {"window_minutes": 10}}"#,
        )
        .unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();

        let from_file = Settings::resolve(
            Overrides::default(),
            env_of(&[(DATA_DIR_ENV, &dir_str)]),
            None,
        )
        .unwrap();
        assert_eq!(from_file.data_dir, dir.path());
        assert_eq!(from_file.tracker.url, "http://file:1");
        assert_eq!(from_file.tracker.event_limit, 50);
        assert_eq!(from_file.tracker.request_timeout_secs, 30);
        assert_eq!(from_file.correlation.window_minutes, 10);
        assert_eq!(from_file.correlation.top_apps, 10);

        let from_env = Settings::resolve(
            Overrides::default(),
            env_of(&[(DATA_DIR_ENV, &dir_str), (TRACKER_URL_ENV, "http://env:2")]),
            None,
        )
        .unwrap();
        assert_eq!(from_env.tracker.url, "http://env:2");

        let from_flags = Settings::resolve(
            Overrides {
                data_dir: Some(dir.path().into()),
                tracker_url: Some("http://flag:3".into()),
            },
            env_of(&[(DATA_DIR_ENV, "/elsewhere"), (TRACKER_URL_ENV, "http://env:2")]),
            None,
        )
        .unwrap();
        assert_eq!(from_flags.data_dir, dir.path());
        assert_eq!(from_flags.tracker.url, "http://flag:3");
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();

        let settings = Settings::resolve(
            Overrides {
                data_dir: Some(dir.path().into()),
                tracker_url: None,
            },
            env_of(&[]),
            None,
        )
        .unwrap();
        assert_eq!(settings.tracker.url, "http://localhost:5600");
    }

    #[test]
    fn unknown_home_without_explicit_dir_is_an_io_error() {
        let err = Settings::resolve(Overrides::default(), env_of(&[]), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
