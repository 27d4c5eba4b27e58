//! Line parser for the syslog-ng control socket STATS protocol.
//!
//! The daemon answers `STATS` with a header line followed by records of the
//! form:
//!
//! ```text
//! SourceName;SourceId;SourceInstance;State;Type;Number
//! dst.file;d_mesg#0;/var/log/messages;a;processed;610
//! src.internal;s_sys#2;;a;processed;72
//! .
//! ```
//!
//! A line starting with `.` marks the end of the output.

use crate::error::ParseError;

/// Command written to the control socket to request statistics.
pub const STATS_COMMAND: &str = "STATS\n";

/// Number of `;`-separated fields in a well-formed record.
const FIELD_COUNT: usize = 6;

/// Shortest object type the daemon emits (`src.`, `dst.`).
const MIN_OBJECT_TYPE_LEN: usize = 4;

/// One parsed STATS record.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    /// Record type, e.g. `src.file`, `dst.file`, `destination`, `global`.
    pub object_type: String,
    /// Configuration id, e.g. `d_mesg#0`. May be empty.
    pub id: String,
    /// Instance, usually a file path or host name. May be empty.
    pub instance: String,
    /// Single letter status code. Not used for routing.
    pub state: String,
    /// Counter name, e.g. `processed`, `dropped`, `stored`, `stamp`.
    pub metric: String,
    pub value: f64,
}

/// Returns true for the end-of-stats marker line.
pub fn is_end_of_stats(line: &str) -> bool {
    line.starts_with('.')
}

/// Parse a single STATS line.
///
/// Trailing whitespace (including the line terminator) is ignored. The line is
/// split into at most six fields, so anything after the fifth `;` belongs to
/// the value and must itself be a number.
pub fn parse_stat_line(line: &str) -> Result<StatRecord, ParseError> {
    let line = line.trim_end();
    let parts: Vec<&str> = line.splitn(FIELD_COUNT, ';').collect();

    let [object_type, id, instance, state, metric, value] = parts.as_slice() else {
        return Err(ParseError::MalformedRecord(format!(
            "insufficient fields: {} < {}",
            parts.len(),
            FIELD_COUNT
        )));
    };

    if object_type.chars().count() < MIN_OBJECT_TYPE_LEN {
        return Err(ParseError::MalformedRecord(format!(
            "invalid object type: '{}'",
            object_type
        )));
    }

    let value = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidValue((*value).to_string()))?;

    Ok(StatRecord {
        object_type: (*object_type).to_string(),
        id: (*id).to_string(),
        instance: (*instance).to_string(),
        state: (*state).to_string(),
        metric: (*metric).to_string(),
        value,
    })
}
