//! syslog-ng STATS protocol support.
//!
//! Parsing and classification of the semicolon-delimited statistics returned
//! by the syslog-ng control socket, plus the logging setup shared by the
//! exporter binary.

#![forbid(unsafe_code)]

pub mod classify;
pub mod error;
pub mod logging;
pub mod protocol;

pub use classify::{Family, LabelValues, MetricKind, NAMESPACE, ObjectClass, Observation, classify};
pub use error::ParseError;
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use protocol::{STATS_COMMAND, StatRecord, is_end_of_stats, parse_stat_line};
