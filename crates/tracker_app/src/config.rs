//! RON configuration file for the binary.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use progress_core::TrackerConfig;
use progress_engine::{ClientSettings, TrackerSettings};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracker_logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "tracker.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// On-disk settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub poll_interval_ms: u64,
    pub animation_tick_ms: u64,
    pub completion_hold_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub seed_percent: u8,
    pub start_message: String,
    /// Also write logs to ./tracker.log.
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let tracker = TrackerSettings::default();
        Self {
            base_url: client.base_url,
            analyze_path: client.analyze_path,
            poll_interval_ms: millis(tracker.poll_interval),
            animation_tick_ms: millis(tracker.animation_tick),
            completion_hold_ms: millis(tracker.completion_hold),
            connect_timeout_ms: millis(client.connect_timeout),
            request_timeout_ms: millis(client.request_timeout),
            submit_timeout_ms: millis(client.submit_timeout),
            seed_percent: tracker.core.seed_percent,
            start_message: tracker.core.start_message,
            log_to_file: false,
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            analyze_path: self.analyze_path.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
        }
    }

    /// `quiet` keeps log lines off the terminal, so they go to the file only.
    pub fn log_destination(&self, quiet: bool) -> LogDestination {
        match (quiet, self.log_to_file) {
            (true, _) => LogDestination::File,
            (false, true) => LogDestination::Both,
            (false, false) => LogDestination::Terminal,
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            animation_tick: Duration::from_millis(self.animation_tick_ms.max(1)),
            completion_hold: Duration::from_millis(self.completion_hold_ms),
            core: TrackerConfig {
                seed_percent: self.seed_percent,
                start_message: self.start_message.clone(),
            },
        }
    }
}

/// Load the config from `path`, or from ./tracker.ron when no path is given.
/// Also returns the file the settings came from, if any.
///
/// An explicit path must exist; the implicit default file is optional.
pub fn load(path: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>), ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok((AppConfig::default(), None));
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok((config, Some(path)))
}

/// Atomically write `config` to `path` (temp file in the same directory, then rename).
pub fn save(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
