//! Error types for the exporter.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the syslog-ng control socket.
///
/// Any of these marks the daemon as down for the current scrape.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("error connecting to syslog-ng at {}: {source}", .path.display())]
    Dial {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing to control socket: {0}")]
    Write(#[source] io::Error),

    #[error("error reading header from control socket: {0}")]
    Read(#[source] io::Error),

    #[error("control socket closed before sending a header")]
    Closed,

    #[error("control socket exchange timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

/// Invalid exporter configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address '{value}': {source}")]
    InvalidListenAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid metrics path '{0}': must start with '/', must not be '/' or '/health' and must not contain route syntax")]
    InvalidMetricsPath(String),

    #[error("socket timeout must be greater than zero")]
    InvalidTimeout,

    #[error("socket path must not be empty")]
    EmptySocketPath,

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ConnectionError::Timeout(Duration::from_secs(30));
        assert_eq!(
            err.to_string(),
            "control socket exchange timed out after 30s"
        );
    }

    #[test]
    fn test_dial_message_includes_path() {
        let err = ConnectionError::Dial {
            path: PathBuf::from("/var/lib/syslog-ng/syslog-ng.ctl"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/var/lib/syslog-ng/syslog-ng.ctl"));
    }
}
