//! Mapping of STATS records onto the exported metric families.
//!
//! Routing is a two-step lookup: the first four characters of the object type
//! select an [`ObjectClass`], then the `(class, metric)` pair is looked up in
//! [`ROUTES`]. Anything not in the table is dropped without error; the daemon
//! reports many record kinds (`stamp`, `global`, `center`) that are not
//! exported.

use crate::protocol::StatRecord;

/// Namespace prefix for every exported family.
pub const NAMESPACE: &str = "syslog_ng";

/// Prometheus metric type of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Object type classes that carry exported metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// `src.*` and `source` records.
    Source,
    /// `dst.*` and `destination` records.
    Destination,
}

impl ObjectClass {
    /// Resolve the class from the first four characters of an object type.
    pub fn from_object_type(object_type: &str) -> Option<Self> {
        match object_type.get(..4)? {
            "src." | "sour" => Some(Self::Source),
            "dst." | "dest" => Some(Self::Destination),
            _ => None,
        }
    }

    /// Label name used for the record instance.
    pub fn instance_label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

/// Exported per-record metric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    SourceProcessed,
    DestinationProcessed,
    DestinationDropped,
    DestinationWritten,
    DestinationStored,
    DestinationMemory,
    DestinationCpu,
}

/// `(class, metric field) -> family` routing table.
const ROUTES: &[(ObjectClass, &str, Family)] = &[
    (ObjectClass::Source, "processed", Family::SourceProcessed),
    (ObjectClass::Destination, "processed", Family::DestinationProcessed),
    (ObjectClass::Destination, "dropped", Family::DestinationDropped),
    (ObjectClass::Destination, "written", Family::DestinationWritten),
    (ObjectClass::Destination, "stored", Family::DestinationStored),
    (ObjectClass::Destination, "queued", Family::DestinationStored),
    (ObjectClass::Destination, "memory_usage", Family::DestinationMemory),
    (ObjectClass::Destination, "cpu_usage", Family::DestinationCpu),
];

impl Family {
    /// Every family, in exposition order.
    pub const ALL: [Family; 7] = [
        Family::SourceProcessed,
        Family::DestinationProcessed,
        Family::DestinationDropped,
        Family::DestinationWritten,
        Family::DestinationStored,
        Family::DestinationMemory,
        Family::DestinationCpu,
    ];

    /// Look up the family for a record class and metric field.
    pub fn route(class: ObjectClass, metric: &str) -> Option<Self> {
        ROUTES
            .iter()
            .find(|(c, m, _)| *c == class && *m == metric)
            .map(|(_, _, family)| *family)
    }

    /// Family name without the namespace prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::SourceProcessed => "source_messages_processed_total",
            Self::DestinationProcessed => "destination_messages_processed_total",
            Self::DestinationDropped => "destination_messages_dropped_total",
            Self::DestinationWritten => "destination_messages_written_total",
            Self::DestinationStored => "destination_messages_stored",
            Self::DestinationMemory => "destination_bytes_stored",
            Self::DestinationCpu => "destination_bytes_processed",
        }
    }

    /// Fully qualified name, e.g. `syslog_ng_destination_messages_stored`.
    pub fn fq_name(self) -> String {
        format!("{}_{}", NAMESPACE, self.name())
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::SourceProcessed => "Number of messages processed by this source.",
            Self::DestinationProcessed => "Number of messages processed by this destination.",
            Self::DestinationDropped => {
                "Number of messages dropped by this destination due to store overflow."
            }
            Self::DestinationWritten => {
                "Number of messages successfully written by this destination."
            }
            Self::DestinationStored => "Number of messages currently stored for this destination.",
            Self::DestinationMemory => {
                "Bytes of memory currently used to store messages for this destination."
            }
            Self::DestinationCpu => "CPU usage reported for this destination.",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Self::SourceProcessed
            | Self::DestinationProcessed
            | Self::DestinationDropped
            | Self::DestinationWritten => MetricKind::Counter,
            Self::DestinationStored | Self::DestinationMemory | Self::DestinationCpu => {
                MetricKind::Gauge
            }
        }
    }

    pub fn class(self) -> ObjectClass {
        match self {
            Self::SourceProcessed => ObjectClass::Source,
            _ => ObjectClass::Destination,
        }
    }

    /// Ordered label schema: object type, id, instance.
    pub fn label_names(self) -> [&'static str; 3] {
        ["type", "id", self.class().instance_label()]
    }
}

/// Label values for one series, in [`Family::label_names`] order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelValues {
    pub object_type: String,
    pub id: String,
    pub instance: String,
}

impl LabelValues {
    pub fn as_array(&self) -> [&str; 3] {
        [self.object_type.as_str(), self.id.as_str(), self.instance.as_str()]
    }
}

/// A classified data point ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub family: Family,
    pub labels: LabelValues,
    pub value: f64,
}

impl Observation {
    pub fn kind(&self) -> MetricKind {
        self.family.kind()
    }
}

/// Classify a record, returning `None` for records that are not exported.
pub fn classify(record: &StatRecord) -> Option<Observation> {
    let class = ObjectClass::from_object_type(&record.object_type)?;
    let family = Family::route(class, &record.metric)?;

    Some(Observation {
        family,
        labels: LabelValues {
            object_type: record.object_type.clone(),
            id: record.id.clone(),
            instance: record.instance.clone(),
        },
        value: record.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_stat_line;

    fn classify_line(line: &str) -> Option<Observation> {
        classify(&parse_stat_line(line).unwrap())
    }

    #[test]
    fn test_source_processed_counter() {
        let obs = classify_line("src.internal;s_sys#2;;a;processed;4").unwrap();
        assert_eq!(obs.family, Family::SourceProcessed);
        assert_eq!(obs.family.fq_name(), "syslog_ng_source_messages_processed_total");
        assert_eq!(obs.kind(), MetricKind::Counter);
        assert_eq!(obs.labels.as_array(), ["src.internal", "s_sys#2", ""]);
        assert_eq!(obs.value, 4.0);
    }

    #[test]
    fn test_destination_stored_gauge() {
        let obs = classify_line("dst.file;d_mesg#0;/var/log/messages;a;stored;0").unwrap();
        assert_eq!(obs.family, Family::DestinationStored);
        assert_eq!(obs.family.name(), "destination_messages_stored");
        assert_eq!(obs.kind(), MetricKind::Gauge);
        assert_eq!(
            obs.labels.as_array(),
            ["dst.file", "d_mesg#0", "/var/log/messages"]
        );
        assert_eq!(obs.value, 0.0);
    }

    #[test]
    fn test_global_not_exported() {
        assert!(classify_line("global;msg_clones;;a;processed;0").is_none());
    }

    #[test]
    fn test_center_not_exported() {
        assert!(classify_line("center;;received;a;processed;72").is_none());
    }

    #[test]
    fn test_stamp_not_exported() {
        assert!(classify_line("src.file;s_sys#1;/dev/kmsg;a;stamp;1556091325").is_none());
    }

    #[test]
    fn test_long_prefixes_route() {
        assert_eq!(
            classify_line("source;s_sys;;a;processed;72").unwrap().family,
            Family::SourceProcessed
        );
        assert_eq!(
            classify_line("destination;d_cron;;a;processed;111").unwrap().family,
            Family::DestinationProcessed
        );
    }

    #[test]
    fn test_queued_shares_stored_family() {
        let obs = classify_line("dst.network;d_remote#0;tcp,host:514;a;queued;12").unwrap();
        assert_eq!(obs.family, Family::DestinationStored);
        assert_eq!(obs.value, 12.0);
    }

    #[test]
    fn test_cpu_usage_has_own_family() {
        let memory = classify_line("dst.file;d;;a;memory_usage;2048").unwrap();
        let cpu = classify_line("dst.file;d;;a;cpu_usage;3").unwrap();
        assert_eq!(memory.family, Family::DestinationMemory);
        assert_eq!(cpu.family, Family::DestinationCpu);
        assert_ne!(memory.family.name(), cpu.family.name());
    }

    #[test]
    fn test_source_only_routes_processed() {
        for metric in ["dropped", "written", "stored", "queued", "memory_usage", "cpu_usage"] {
            let line = format!("src.file;s;;a;{};1", metric);
            assert!(classify_line(&line).is_none(), "{} should not route", metric);
        }
    }

    #[test]
    fn test_destination_counter_families() {
        assert_eq!(
            classify_line("dst.file;d;;a;dropped;1").unwrap().kind(),
            MetricKind::Counter
        );
        assert_eq!(
            classify_line("dst.file;d;;a;written;1").unwrap().family,
            Family::DestinationWritten
        );
    }

    #[test]
    fn test_prefix_on_multibyte_boundary() {
        assert_eq!(ObjectClass::from_object_type("dsté.file"), None);
        assert_eq!(ObjectClass::from_object_type("ds"), None);
    }

    #[test]
    fn test_label_schema() {
        assert_eq!(
            Family::SourceProcessed.label_names(),
            ["type", "id", "source"]
        );
        assert_eq!(
            Family::DestinationCpu.label_names(),
            ["type", "id", "destination"]
        );
    }

    #[test]
    fn test_every_family_is_routable() {
        for family in Family::ALL {
            assert!(
                ROUTES.iter().any(|(_, _, f)| *f == family),
                "{:?} has no route",
                family
            );
        }
    }
}
