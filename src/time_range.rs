// =============================================================================
// Time-range parsing — user strings to a validated [start, end) window
// =============================================================================

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::IngestError;

/// Accepted formats, tried in order of decreasing precision. The first format
/// that fully matches the input wins; no partial matches.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated pair of naive timestamps with `start < end`.
///
/// Naive inputs are interpreted as UTC when converted to epoch milliseconds;
/// Binance timestamps are UTC as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    /// Parse two user-supplied strings into a `TimeRange`.
    pub fn parse(start: &str, end: &str) -> Result<Self, IngestError> {
        let start = parse_datetime(start)?;
        let end = parse_datetime(end)?;
        if start >= end {
            return Err(IngestError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Inclusive lower bound in milliseconds since epoch.
    pub fn start_millis(&self) -> i64 {
        self.start.and_utc().timestamp_millis()
    }

    /// Exclusive upper bound in milliseconds since epoch.
    pub fn end_millis(&self) -> i64 {
        self.end.and_utc().timestamp_millis()
    }
}

/// Parse a single timestamp string in one of the three accepted formats.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, IngestError> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    // Date-only inputs start at midnight.
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
    Err(IngestError::InvalidTimeFormat(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_only_as_midnight() {
        let dt = parse_datetime("2025-10-01").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-10-01 00:00:00");
    }

    #[test]
    fn round_trips_each_precision() {
        for (value, fmt) in [
            ("2025-10-01", "%Y-%m-%d"),
            ("2025-10-01 12:30", "%Y-%m-%d %H:%M"),
            ("2025-10-01 12:30:45", "%Y-%m-%d %H:%M:%S"),
        ] {
            let dt = parse_datetime(value).unwrap();
            assert_eq!(dt.format(fmt).to_string(), value);
        }
    }

    #[test]
    fn higher_precision_format_wins() {
        let dt = parse_datetime("2025-10-01 12:30:45").unwrap();
        assert_eq!(dt.and_utc().timestamp() % 60, 45);
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["invalid-date", "2025/10/01", "2025-10-01T12:30", "2025-13-01", "2025-10-01 25:00", ""] {
            assert!(
                matches!(parse_datetime(bad), Err(IngestError::InvalidTimeFormat(_))),
                "expected InvalidTimeFormat for {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_unordered_range() {
        let err = TimeRange::parse("2025-10-02", "2025-10-01").unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimeRange { .. }));
    }

    #[test]
    fn rejects_equal_bounds() {
        let err = TimeRange::parse("2025-10-01 12:30", "2025-10-01 12:30").unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimeRange { .. }));
    }

    #[test]
    fn millis_are_utc() {
        let range = TimeRange::parse("2023-10-01", "2023-10-02").unwrap();
        assert_eq!(range.start_millis(), 1_696_118_400_000);
        assert_eq!(range.end_millis(), 1_696_204_800_000);
    }
}
