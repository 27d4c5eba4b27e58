//! Logging initialization for the exporter.
//!
//! Console output goes to stderr so that nothing interferes with anything a
//! supervisor captures on stdout. An optional daily-rotating log file can be
//! added alongside it.

use anyhow::Result;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable prefix for logging settings.
const ENV_PREFIX: &str = "SYSLOG_NG_EXPORTER_LOG";

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line output.
    Compact,
}

impl LogFormat {
    /// Parse `pretty`, `json` or `compact`, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Configuration for logging initialization.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level (trace, debug, info, warn, error, off).
    pub level: String,
    pub format: LogFormat,
    /// Optional path of a daily-rotating log file.
    pub file_path: Option<PathBuf>,
    /// Per-target level overrides.
    pub targets: BTreeMap<String, String>,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file_path: None,
            targets: BTreeMap::new(),
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Build a logging configuration from the environment.
    ///
    /// - `SYSLOG_NG_EXPORTER_LOG_LEVEL`
    /// - `SYSLOG_NG_EXPORTER_LOG_FORMAT` (pretty|json|compact)
    /// - `SYSLOG_NG_EXPORTER_LOG_FILE`
    /// - `SYSLOG_NG_EXPORTER_LOG_TARGETS` (comma-separated `target=level`)
    pub fn from_env(default_level: &str) -> Self {
        Self::from_lookup(default_level, |key| std::env::var(key).ok())
    }

    fn from_lookup(default_level: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

        let mut config = Self {
            level: var("LEVEL").unwrap_or_else(|| default_level.to_string()),
            ..Self::default()
        };

        if let Some(format) = var("FORMAT").as_deref().and_then(LogFormat::parse) {
            config.format = format;
        }

        config.file_path = var("FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(targets) = var("TARGETS") {
            config.targets = parse_target_overrides(&targets);
        }

        config
    }

    /// Override the base log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Build the effective filter. `RUST_LOG` wins when it is set and valid.
    pub fn env_filter(&self) -> EnvFilter {
        if std::env::var_os("RUST_LOG").is_some() {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return filter;
            }
        }

        let directives = std::iter::once(self.level.clone())
            .chain(
                self.targets
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    }
}

/// Keeps the background file writer alive. Hold it until shutdown.
pub struct LoggingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second call keeps the first
/// subscriber.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards> {
    let (writer, file_guard) = build_writer(config);
    let ansi = file_guard.is_none();

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(config.with_target)
            .with_ansi(ansi)
            .pretty()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(writer)
            .with_target(config.with_target)
            .with_ansi(false)
            .json()
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_writer(writer)
            .with_target(config.with_target)
            .with_ansi(ansi)
            .compact()
            .boxed(),
    };

    let subscriber = Registry::default().with(config.env_filter()).with(layer);
    if let Err(err) = subscriber.try_init() {
        if !err.to_string().contains("already") {
            return Err(err.into());
        }
    }

    Ok(LoggingGuards {
        _file_guard: file_guard,
    })
}

fn build_writer(config: &LogConfig) -> (BoxMakeWriter, Option<WorkerGuard>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let Some(path) = config.file_path.as_ref() else {
        return (BoxMakeWriter::new(std::io::stderr), None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new("syslog_ng_exporter.log"));
    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    (
        BoxMakeWriter::new(std::io::stderr.and(non_blocking)),
        Some(guard),
    )
}

fn parse_target_overrides(value: &str) -> BTreeMap<String, String> {
    value
        .split(',')
        .filter_map(|entry| entry.trim().split_once('='))
        .map(|(target, level)| (target.trim(), level.trim().to_ascii_lowercase()))
        .filter(|(target, level)| !target.is_empty() && is_valid_level(level))
        .map(|(target, level)| (target.to_string(), level))
        .collect()
}

fn is_valid_level(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error" | "off")
}
