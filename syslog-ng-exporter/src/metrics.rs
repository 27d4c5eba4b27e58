//! Prometheus registry owned by the exporter.
//!
//! The per-record families are rebuilt on every scrape: each publish resets
//! them and writes only what the daemon reported this time, so a series that
//! disappears from the STATS output disappears from the exposition too.

use anyhow::Result;
use std::collections::HashSet;
use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder,
};
use syslog_ng_stats::{Family, MetricKind, NAMESPACE, Observation};
use tracing::debug;

use crate::collector::ScrapeResult;

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

enum FamilyVec {
    Counter(CounterVec),
    Gauge(GaugeVec),
}

impl FamilyVec {
    fn new(family: Family) -> prometheus::Result<Self> {
        let opts = Opts::new(family.name(), family.help()).namespace(NAMESPACE);
        let labels = family.label_names();
        Ok(match family.kind() {
            MetricKind::Counter => Self::Counter(CounterVec::new(opts, &labels)?),
            MetricKind::Gauge => Self::Gauge(GaugeVec::new(opts, &labels)?),
        })
    }

    fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        match self {
            Self::Counter(vec) => registry.register(Box::new(vec.clone())),
            Self::Gauge(vec) => registry.register(Box::new(vec.clone())),
        }
    }

    fn reset(&self) {
        match self {
            Self::Counter(vec) => vec.reset(),
            Self::Gauge(vec) => vec.reset(),
        }
    }

    fn record(&self, observation: &Observation) {
        let labels = observation.labels.as_array();
        match self {
            Self::Counter(vec) => {
                if observation.value < 0.0 {
                    debug!(
                        family = observation.family.name(),
                        value = observation.value,
                        "Skipping negative counter value"
                    );
                    return;
                }
                let counter = vec.with_label_values(&labels);
                counter.reset();
                counter.inc_by(observation.value);
            }
            Self::Gauge(vec) => vec.with_label_values(&labels).set(observation.value),
        }
    }
}

/// Registry and metric handles for one exporter instance.
pub struct ExporterMetrics {
    registry: Registry,
    families: Vec<(Family, FamilyVec)>,
    up: Gauge,
    scrape_success: IntCounter,
    scrape_failures: IntCounter,
}

impl ExporterMetrics {
    /// Create a registry with every family registered.
    pub fn new(version: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let mut families = Vec::with_capacity(Family::ALL.len());
        for family in Family::ALL {
            let vec = FamilyVec::new(family)?;
            vec.register(&registry)?;
            families.push((family, vec));
        }

        let up = Gauge::with_opts(
            Opts::new("up", "Reads 1 if the syslog-ng server could be reached, else 0.")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(up.clone()))?;

        let scrape_failures = IntCounter::with_opts(
            Opts::new(
                "exporter_scrape_failures_total",
                "Number of errors while scraping syslog-ng.",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(scrape_failures.clone()))?;

        let scrape_success = IntCounter::with_opts(
            Opts::new(
                "exporter_scrape_success_total",
                "Number of successful scrapes of syslog-ng.",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(scrape_success.clone()))?;

        let build_info = GaugeVec::new(
            Opts::new("exporter_build_info", "Exporter version info (always 1).")
                .namespace(NAMESPACE),
            &["version"],
        )?;
        registry.register(Box::new(build_info.clone()))?;
        build_info.with_label_values(&[version]).set(1.0);

        Ok(Self {
            registry,
            families,
            up,
            scrape_success,
            scrape_failures,
        })
    }

    /// Replace the exposed values with the outcome of one scrape.
    ///
    /// Returns how many observations overwrote an earlier one with the same
    /// family and labels in this scrape. The last value wins.
    pub fn publish(&self, result: &ScrapeResult) -> usize {
        for (_, vec) in &self.families {
            vec.reset();
        }

        if result.up {
            self.up.set(1.0);
            self.scrape_success.inc();
        } else {
            self.up.set(0.0);
            self.scrape_failures.inc();
        }

        let mut seen = HashSet::with_capacity(result.observations.len());
        let mut overwritten = 0;
        for observation in &result.observations {
            if !seen.insert((observation.family, &observation.labels)) {
                debug!(
                    family = observation.family.name(),
                    labels = ?observation.labels.as_array(),
                    value = observation.value,
                    "Series reported twice in one scrape, keeping the last value"
                );
                overwritten += 1;
            }
            if let Some((_, vec)) = self.families.iter().find(|(f, _)| *f == observation.family) {
                vec.record(observation);
            }
        }
        overwritten
    }

    pub fn up(&self) -> f64 {
        self.up.get()
    }

    pub fn scrape_success_total(&self) -> u64 {
        self.scrape_success.get()
    }

    pub fn scrape_failures_total(&self) -> u64 {
        self.scrape_failures.get()
    }

    /// Encode the registry in the text exposition format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
