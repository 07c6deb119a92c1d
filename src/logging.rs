//! File logging.
//!
//! Each run of `ocpc` writes one file under `~/.ocp-complete/logs/`. Files
//! past the retention window are swept at startup.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Deserializer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Hours a log file is kept by default.
pub const DEFAULT_RETENTION_HOURS: u32 = 24;

const LOG_FILE_PREFIX: &str = "ocp-complete_";

/// `[log]` table of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write a log file at all.
    pub enabled: bool,
    /// Most verbose level recorded. `RUST_LOG` takes precedence.
    #[serde(deserialize_with = "deserialize_level")]
    pub level: LevelFilter,
    /// Age in hours after which old log files are deleted.
    pub retention_hours: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::INFO,
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }
}

impl LogConfig {
    /// Returns whether a log file should be opened.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.level != LevelFilter::OFF
    }

    fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_hours) * 3600)
    }
}

/// Reads a level name, accepting a few common aliases.
///
/// Unrecognized names fall back to `info`.
#[must_use]
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        "none" | "disabled" => LevelFilter::OFF,
        other => other.parse().unwrap_or(LevelFilter::INFO),
    }
}

fn deserialize_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LevelFilter, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(parse_level(&name))
}

/// `~/.ocp-complete/logs`
#[must_use]
pub fn log_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ocp-complete")
        .join("logs")
}

/// Path for a log file started now.
#[must_use]
pub fn log_path_in(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("{LOG_FILE_PREFIX}{stamp}.log"))
}

/// Removes `.log` files in `dir` last modified more than `max_age` ago.
///
/// Returns how many were removed. A missing directory holds nothing.
///
/// # Errors
///
/// Fails if `dir` exists but cannot be listed. Files that cannot be removed
/// are skipped.
pub fn prune_logs(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let is_stale = |path: &Path| {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > max_age)
    };

    let removed = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .filter(|path| is_stale(path.as_path()))
        .filter(|path| fs::remove_file(path).is_ok())
        .count();

    Ok(removed)
}

/// Installs the global file subscriber.
///
/// Does nothing when logging is disabled or the level is `off`.
///
/// # Errors
///
/// Fails if the log directory cannot be created or listed, if the log file
/// cannot be created, or if a global subscriber is already installed.
pub fn init(config: &LogConfig) -> io::Result<()> {
    if !config.is_active() {
        return Ok(());
    }

    let dir = log_directory();
    fs::create_dir_all(&dir)?;
    let pruned = prune_logs(&dir, config.retention())?;

    let path = log_path_in(&dir);
    let file = File::create(&path)?;

    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(Mutex::new(file).with_max_level(tracing::Level::TRACE))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(
        path = %path.display(),
        level = %config.level,
        pruned,
        "logging started"
    );

    Ok(())
}
