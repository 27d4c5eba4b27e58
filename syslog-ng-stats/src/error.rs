//! Errors produced while parsing STATS output.

use thiserror::Error;

/// A STATS line that could not be turned into a [`crate::StatRecord`].
///
/// Both variants are recoverable: the offending line is skipped and the
/// scrape carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid value '{0}': not a finite number")]
    InvalidValue(String),
}
