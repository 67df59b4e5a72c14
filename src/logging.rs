//! Logging setup
//!
//! Installs a `tracing` subscriber for binaries and demos. Library code only
//! emits events; nothing in the crate installs a subscriber on its own.
//!
//! ```ignore
//! let _guard = logging::init_logging(&LogConfig::from_env())?;
//! ```
//!
//! Keep the returned guard alive for as long as file output should be flushed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Prefix of rolling log files
pub const LOG_FILE_PREFIX: &str = "shared-state.log";

const ENV_FILTER: &str = "RUST_LOG";
const ENV_JSON: &str = "SHARED_STATE_LOG_JSON";
const ENV_DIR: &str = "SHARED_STATE_LOG_DIR";

/// How logs are filtered, formatted and where they go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `info,shadow_state_sdk=debug`
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Write to daily rolling files in this directory instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `RUST_LOG`, `SHARED_STATE_LOG_JSON` and `SHARED_STATE_LOG_DIR`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup(ENV_FILTER)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let json = lookup(ENV_JSON)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let log_dir = lookup(ENV_DIR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            filter,
            json,
            log_dir,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Install the global subscriber
///
/// Returns the appender guard when logging to files. Fails if the filter
/// does not parse, the log directory cannot be created, or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("Invalid log filter '{}'", config.filter))?;
    let registry = tracing_subscriber::registry().with(filter);

    match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            if config.json {
                registry.with(layer.json()).try_init()?;
            } else {
                registry.with(layer).try_init()?;
            }
            tracing::debug!("Logging to {:?}", dir);
            Ok(Some(guard))
        }
        None => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if config.json {
                registry.with(layer.json()).try_init()?;
            } else {
                registry.with(layer).try_init()?;
            }
            Ok(None)
        }
    }
}

fn file_writer(dir: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
