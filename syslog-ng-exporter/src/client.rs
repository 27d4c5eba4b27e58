//! Client for the syslog-ng control socket.
//!
//! One exchange per scrape: connect, send `STATS`, discard the header line,
//! then read data lines until the `.` end marker. The whole exchange runs
//! under a single deadline and the connection is dropped on every exit path.

use crate::error::ConnectionError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use syslog_ng_stats::{STATS_COMMAND, is_end_of_stats};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

/// Raw STATS output for one scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsResponse {
    /// Header line, without the terminator.
    pub header: String,
    /// Data lines as received, including the end marker when one was seen.
    pub body: String,
    /// Whether the end marker was received before the stream ended.
    pub complete: bool,
}

/// Client for a syslog-ng control socket.
#[derive(Debug, Clone)]
pub struct StatsClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl StatsClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Run one STATS exchange against the control socket.
    pub async fn fetch_stats(&self) -> Result<StatsResponse, ConnectionError> {
        match tokio::time::timeout(self.timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self) -> Result<StatsResponse, ConnectionError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ConnectionError::Dial {
                path: self.socket_path.clone(),
                source,
            })?;
        let (reader, mut writer) = stream.into_split();

        writer
            .write_all(STATS_COMMAND.as_bytes())
            .await
            .map_err(ConnectionError::Write)?;
        writer.flush().await.map_err(ConnectionError::Write)?;

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(ConnectionError::Read)?;
        if n == 0 {
            return Err(ConnectionError::Closed);
        }

        let mut response = StatsResponse {
            header: String::from_utf8_lossy(&buf).trim_end().to_string(),
            ..StatsResponse::default()
        };

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    debug!("Control socket closed before end of STATS output");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "Read error after STATS header, treating as end of output");
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            if !line.ends_with('\n') {
                debug!(fragment = %line, "Dropping unterminated line at end of STATS output");
                break;
            }
            response.body.push_str(&line);

            if is_end_of_stats(&line) {
                debug!("Reached end of STATS output");
                response.complete = true;
                break;
            }
        }

        Ok(response)
    }
}
