//! Exporter configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command line flags.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default address for the metrics listener.
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9577";

/// Default path of the metrics endpoint.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Default location of the syslog-ng control socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/lib/syslog-ng/syslog-ng.ctl";

/// Deadline for one control socket exchange.
pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 30;

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Address on which to expose metrics.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path under which to expose metrics.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Path to the syslog-ng control socket.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Deadline in seconds covering connect, request and response.
    #[serde(default = "default_socket_timeout_secs")]
    pub socket_timeout_secs: u64,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            metrics_path: default_metrics_path(),
            socket_path: default_socket_path(),
            socket_timeout_secs: default_socket_timeout_secs(),
            insecure: false,
        }
    }
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

fn default_socket_timeout_secs() -> u64 {
    DEFAULT_SOCKET_TIMEOUT_SECS
}

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_address: Option<String>,
    pub metrics_path: Option<String>,
    pub socket_path: Option<PathBuf>,
    pub socket_timeout_secs: Option<u64>,
    pub insecure: bool,
}

impl ExporterConfig {
    /// Apply command line overrides on top of this configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(addr) = overrides.listen_address {
            self.listen_address = addr;
        }
        if let Some(path) = overrides.metrics_path {
            self.metrics_path = path;
        }
        if let Some(path) = overrides.socket_path {
            self.socket_path = path;
        }
        if let Some(secs) = overrides.socket_timeout_secs {
            self.socket_timeout_secs = secs;
        }
        self.insecure |= overrides.insecure;
        self
    }

    /// Resolve the listen address.
    ///
    /// A bare `:port` binds on all interfaces.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.listen_address.trim();
        let normalized = match value.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => value.to_string(),
        };
        normalized
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddress {
                value: self.listen_address.clone(),
                source,
            })
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }

    /// Check the configuration, returning the resolved listen address.
    pub fn validate(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.listen_addr()?;

        let reserved = matches!(self.metrics_path.as_str(), "/" | "/health");
        let has_route_syntax = self.metrics_path.contains(['{', '}', '*']);
        if !self.metrics_path.starts_with('/') || reserved || has_route_syntax {
            return Err(ConfigError::InvalidMetricsPath(self.metrics_path.clone()));
        }
        if self.socket_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySocketPath);
        }

        Ok(addr)
    }
}

/// Load configuration from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ExporterConfig, ConfigError> {
    let Some(path) = path else {
        debug!("No config file given, using defaults");
        return Ok(ExporterConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found at {:?}, using defaults", path);
        return Ok(ExporterConfig::default());
    }

    info!("Loading exporter config from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate an example configuration file.
pub fn example_config() -> String {
    r#"# syslog-ng exporter configuration

# Address on which to expose metrics (":9577" binds all interfaces)
listen_address = "0.0.0.0:9577"

# Path under which to expose metrics
metrics_path = "/metrics"

# Path to the syslog-ng control socket
socket_path = "/var/lib/syslog-ng/syslog-ng.ctl"

# Deadline for one STATS exchange, in seconds
socket_timeout_secs = 30

# Skip TLS certificate verification
insecure = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExporterConfig::default();
        assert_eq!(config.listen_address, "0.0.0.0:9577");
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(
            config.socket_path,
            PathBuf::from("/var/lib/syslog-ng/syslog-ng.ctl")
        );
        assert_eq!(config.socket_timeout(), Duration::from_secs(30));
        assert!(!config.insecure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: ExporterConfig = toml::from_str(&example_config()).unwrap();
        assert_eq!(config, ExporterConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ExporterConfig = toml::from_str("socket_path = \"/run/syslog-ng.ctl\"").unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/run/syslog-ng.ctl"));
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.socket_timeout_secs, 30);
    }

    #[test]
    fn test_overrides_win() {
        let config = ExporterConfig::default().with_overrides(ConfigOverrides {
            listen_address: Some("127.0.0.1:9999".to_string()),
            metrics_path: Some("/stats".to_string()),
            socket_path: None,
            socket_timeout_secs: Some(5),
            insecure: true,
        });
        assert_eq!(config.listen_address, "127.0.0.1:9999");
        assert_eq!(config.metrics_path, "/stats");
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert_eq!(config.socket_timeout(), Duration::from_secs(5));
        assert!(config.insecure);
    }

    #[test]
    fn test_bare_port_listen_address() {
        let config = ExporterConfig {
            listen_address: ":9577".to_string(),
            ..ExporterConfig::default()
        };
        assert_eq!(
            config.listen_addr().unwrap(),
            "0.0.0.0:9577".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_listen_address() {
        let config = ExporterConfig {
            listen_address: "not-an-address".to_string(),
            ..ExporterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidListenAddress { .. })
        ));
    }

    #[test]
    fn test_invalid_metrics_paths() {
        for path in [
            "metrics",
            "/",
            "/health",
            "",
            "/metrics{",
            "/{path}",
            "/metrics/*rest",
            "/metrics}",
        ] {
            let config = ExporterConfig {
                metrics_path: path.to_string(),
                ..ExporterConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidMetricsPath(_))),
                "{:?} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ExporterConfig {
            socket_timeout_secs: 0,
            ..ExporterConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_load_config_without_path() {
        assert_eq!(load_config(None).unwrap(), ExporterConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metrics_path = \"/syslog\"\nsocket_timeout_secs = 10").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.metrics_path, "/syslog");
        assert_eq!(config.socket_timeout_secs, 10);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config, ExporterConfig::default());
    }

    #[test]
    fn test_load_config_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(Some(dir.path())),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_config_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "socket_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }
}
