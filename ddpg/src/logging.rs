//! Structured logging setup.
//!
//! All crate output goes through `tracing`. The binary calls
//! [`init_logging`] once at startup; library users may install their own
//! subscriber instead.
//!
//! | Target | Events |
//! |--------|--------|
//! | `ddpg::runners` | episode ends (info), learning bursts (debug), checkpoints (info) |
//! | `ddpg::checkpoint` | checkpoint writes |
//! | `ddpg::environment` | per-step render output (trace) |
//!
//! ```bash
//! RUST_LOG=ddpg=debug ddpg-trainer --preset pendulum
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::BoxedError;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable with colors
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON lines
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{}`", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Also write JSON lines to this file.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Filter from `RUST_LOG`, falling back to the configured level.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set or the log file cannot be
/// created.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BoxedError> {
    if let Some(path) = &config.log_file {
        file_subscriber(config, path)?.try_init()?;
        return Ok(());
    }

    let filter = config.env_filter();
    match config.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    }
}

/// Console output in the configured format plus JSON lines written to `path`.
fn file_subscriber(config: &LoggingConfig, path: &Path) -> Result<Box<dyn Subscriber + Send + Sync>, BoxedError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = Mutex::new(File::create(path)?);
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Json => Box::new(
            registry
                .with(fmt::layer().json())
                .with(json_file_layer(file)),
        ),
        LogFormat::Compact => Box::new(
            registry
                .with(fmt::layer().compact())
                .with(json_file_layer(file)),
        ),
        LogFormat::Pretty => Box::new(
            registry
                .with(fmt::layer().with_target(false))
                .with(json_file_layer(file)),
        ),
    };
    Ok(subscriber)
}

fn json_file_layer<S>(file: Mutex<File>) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().with_writer(file).with_ansi(false).json()
}
