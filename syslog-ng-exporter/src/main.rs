//! syslog-ng exporter binary.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use syslog_ng_exporter::config::example_config;
use syslog_ng_exporter::{
    Collector, ConfigOverrides, ExporterMetrics, HttpState, StatsClient, load_config, serve,
};
use syslog_ng_stats::{LogConfig, LogFormat, init_logging};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "syslog_ng_exporter")]
#[command(author, version, about = "Prometheus exporter for syslog-ng statistics")]
struct Cli {
    /// Address on which to expose metrics
    #[arg(long = "telemetry.address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "telemetry.endpoint")]
    metrics_path: Option<String>,

    /// Path to the syslog-ng control socket
    #[arg(long = "socket.path")]
    socket_path: Option<PathBuf>,

    /// Deadline for one control socket exchange, in seconds
    #[arg(long = "socket.timeout")]
    socket_timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    log_level: Option<String>,

    /// Output format of log messages
    #[arg(long = "log.format", value_parser = ["compact", "pretty", "json"])]
    log_format: Option<String>,

    /// Enable verbose output (same as --log.level debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen_address: self.listen_address.clone(),
            metrics_path: self.metrics_path.clone(),
            socket_path: self.socket_path.clone(),
            socket_timeout_secs: self.socket_timeout,
            insecure: self.insecure,
        }
    }

    /// Apply the logging flags on top of the environment settings.
    fn log_config(&self, mut config: LogConfig) -> LogConfig {
        if let Some(level) = &self.log_level {
            config = config.with_level(level.as_str());
        }
        if let Some(format) = self.log_format.as_deref().and_then(LogFormat::parse) {
            config.format = format;
        }
        if self.verbose {
            config = config.with_level("debug");
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.example_config {
        print!("{}", example_config());
        return Ok(());
    }

    let log_config = cli.log_config(LogConfig::from_env("info"));
    let _logging_guards = init_logging(&log_config)?;

    let config = load_config(cli.config.as_deref())?.with_overrides(cli.overrides());
    let addr = config.validate().context("Invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        socket = %config.socket_path.display(),
        "Starting syslog_ng_exporter"
    );
    if config.insecure {
        warn!("--insecure has no effect: the metrics listener serves plain HTTP");
    }

    let metrics = ExporterMetrics::new(env!("CARGO_PKG_VERSION"))
        .context("Failed to register metrics")?;
    let client = StatsClient::new(config.socket_path.clone(), config.socket_timeout());
    let state = HttpState {
        collector: Arc::new(Collector::new(client, metrics)),
        metrics_path: config.metrics_path.clone(),
        version: env!("CARGO_PKG_VERSION"),
        started_at: Instant::now(),
    };

    serve(addr, state).await
}
