//! Closed set of failures the aggregation core surfaces to callers.
//! Per-line decode problems and missing fields never show up here; they are
//! absorbed where the record is read.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input does not exist, is not a regular file, or cannot be opened.
    #[error("source unreachable: {location}")]
    SourceUnreachable {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Reading failed part-way through the input (including corrupt zstd frames).
    #[error("read failed: {location}")]
    Read {
        location: String,
        #[source]
        source: io::Error,
    },

    /// A line the columnar loader could not decode at all. Streaming scans skip these.
    #[error("fatal decode error at line {line}")]
    DecodeFatal {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

impl Error {
    /// True for the error kinds that abort a single strategy rather than every strategy.
    pub fn is_strategy_specific(&self) -> bool {
        matches!(self, Error::DecodeFatal { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
