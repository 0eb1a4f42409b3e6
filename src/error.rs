// =============================================================================
// Error taxonomy for the ingestion pipeline
// =============================================================================
//
// Every failure is local to a single ingestion call and is returned to the
// immediate caller. Nothing here is retried or logged-and-swallowed.
// =============================================================================

use chrono::NaiveDateTime;
use thiserror::Error;

/// All failures the ingestion pipeline can surface.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The supplied string matched none of the accepted time formats.
    #[error("unrecognized time format '{0}' (expected YYYY-MM-DD, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS)")]
    InvalidTimeFormat(String),

    /// Parsed fine, but start is not strictly before end.
    #[error("invalid time range: start {start} must be earlier than end {end}")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A raw exchange record violated the documented 12-field kline shape.
    #[error("malformed kline record #{index}: field '{field}' has unparsable value {value}")]
    MalformedRecord {
        index: usize,
        field: &'static str,
        value: String,
    },

    /// Opaque network/API failure talking to the exchange.
    #[error("exchange request failed: {0}")]
    ExchangeRequest(String),

    /// Failure to open, create, or write the local database.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for IngestError {
    fn from(e: reqwest::Error) -> Self {
        Self::ExchangeRequest(e.to_string())
    }
}

impl From<rusqlite::Error> for IngestError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
