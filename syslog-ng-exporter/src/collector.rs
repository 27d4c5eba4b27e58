//! Scrape orchestration.
//!
//! A scrape takes the scrape lock, runs one STATS exchange, parses and
//! classifies every line up to the end marker, then publishes the result to
//! the registry. Concurrent scrape requests queue on the lock, so at most one
//! control socket connection is open at a time.

use syslog_ng_stats::{Observation, classify, is_end_of_stats, parse_stat_line};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::client::{StatsClient, StatsResponse};
use crate::metrics::ExporterMetrics;

/// Outcome of one scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeResult {
    /// Whether the daemon was reached and its output read.
    pub up: bool,
    /// Classified data points, in response order.
    pub observations: Vec<Observation>,
    /// Lines that failed to parse.
    pub skipped_lines: usize,
}

impl ScrapeResult {
    /// Result for an unreachable daemon.
    pub fn down() -> Self {
        Self::default()
    }

    /// Parse and classify a STATS body.
    ///
    /// Stops at the end marker. Malformed lines are skipped and counted;
    /// well-formed records without a metric mapping are ignored.
    pub fn from_response(response: &StatsResponse) -> Self {
        let mut result = Self {
            up: true,
            ..Self::default()
        };

        for line in response.body.lines() {
            if is_end_of_stats(line) {
                break;
            }

            match parse_stat_line(line) {
                Ok(record) => {
                    debug!(?record, "Parsed STATS line");
                    if let Some(observation) = classify(&record) {
                        result.observations.push(observation);
                    }
                }
                Err(e) => {
                    debug!(line, error = %e, "Skipping STATS line");
                    result.skipped_lines += 1;
                }
            }
        }

        result
    }
}

/// Serializes scrapes of one syslog-ng instance into one registry.
pub struct Collector {
    client: StatsClient,
    metrics: ExporterMetrics,
    scrape_lock: Mutex<()>,
}

impl Collector {
    pub fn new(client: StatsClient, metrics: ExporterMetrics) -> Self {
        Self {
            client,
            metrics,
            scrape_lock: Mutex::new(()),
        }
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Run one scrape and publish it to the registry.
    pub async fn collect(&self) -> ScrapeResult {
        let _scrape = self.scrape_lock.lock().await;
        self.collect_locked().await
    }

    /// Run one scrape and encode the registry before another scrape can
    /// overwrite it.
    pub async fn collect_and_encode(&self) -> anyhow::Result<String> {
        let _scrape = self.scrape_lock.lock().await;
        self.collect_locked().await;
        self.metrics.encode()
    }

    async fn collect_locked(&self) -> ScrapeResult {
        let result = match self.client.fetch_stats().await {
            Ok(response) => {
                if !response.complete {
                    debug!("STATS output ended without end marker");
                }
                let result = ScrapeResult::from_response(&response);
                info!(
                    observations = result.observations.len(),
                    skipped = result.skipped_lines,
                    "Scraped syslog-ng"
                );
                result
            }
            Err(e) => {
                error!(
                    socket = %self.client.socket_path().display(),
                    error = %e,
                    "Error scraping syslog-ng"
                );
                ScrapeResult::down()
            }
        };

        self.metrics.publish(&result);
        result
    }
}
