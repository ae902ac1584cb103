//! Timestamp conversion helpers.
//!
//! The TIME index is stored as `Datetime(Milliseconds, None)`, i.e. UTC
//! milliseconds since the Unix epoch.

use crate::constants::{ACCEPTED_DATE_FORMAT, ACCEPTED_DATETIME_FORMATS, METADATA_DATETIME_FORMAT};
use crate::error::{Result, WaterFrameError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an ISO-8601 style timestamp into UTC
///
/// RFC 3339 strings keep their offset; naive strings are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    for format in ACCEPTED_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, ACCEPTED_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| WaterFrameError::TimeParse {
            value: value.to_string(),
        })
}

/// Format a timestamp the way metadata stores it
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(METADATA_DATETIME_FORMAT).to_string()
}

pub fn to_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| WaterFrameError::TimeParse {
        value: millis.to_string(),
    })
}
