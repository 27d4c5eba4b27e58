//! syslog-ng Prometheus exporter.
//!
//! Scrapes the syslog-ng control socket on every request to the metrics
//! endpoint and republishes source and destination statistics.

#![forbid(unsafe_code)]

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod http_api;
pub mod metrics;

pub use client::{StatsClient, StatsResponse};
pub use collector::{Collector, ScrapeResult};
pub use config::{ConfigOverrides, ExporterConfig, load_config};
pub use error::{ConfigError, ConnectionError};
pub use http_api::{HttpState, create_router, serve};
pub use metrics::ExporterMetrics;
