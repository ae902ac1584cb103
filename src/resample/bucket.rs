//! Resample rules and the bucket each timestamp falls into.
//!
//! Fixed-width buckets are counted forward from the Unix epoch, so a
//! `Days(1)` bucket always starts at midnight UTC and an `Hours(6)` bucket
//! at 00, 06, 12 or 18 h. Week buckets start on Monday. Month buckets
//! start on the first day of a month, counted from January 1970.

use crate::error::{Result, WaterFrameError};
use crate::frame::timestamps::{from_millis, to_millis};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
const MILLIS_PER_WEEK: i64 = 7 * MILLIS_PER_DAY;

/// 1970-01-05, the first Monday after the epoch
const FIRST_MONDAY_OFFSET: i64 = 4 * MILLIS_PER_DAY;

/// Width of a resample bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleRule {
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl ResampleRule {
    fn width_millis(&self) -> Option<i64> {
        match *self {
            ResampleRule::Seconds(n) => Some(i64::from(n) * MILLIS_PER_SECOND),
            ResampleRule::Minutes(n) => Some(i64::from(n) * MILLIS_PER_MINUTE),
            ResampleRule::Hours(n) => Some(i64::from(n) * MILLIS_PER_HOUR),
            ResampleRule::Days(n) => Some(i64::from(n) * MILLIS_PER_DAY),
            ResampleRule::Weeks(n) => Some(i64::from(n) * MILLIS_PER_WEEK),
            ResampleRule::Months(_) => None,
        }
    }

    /// Start of the bucket containing `millis`, in epoch milliseconds
    pub fn bucket_start(&self, millis: i64) -> Result<i64> {
        let invalid = |reason: &str| WaterFrameError::InvalidRule {
            rule: self.to_string(),
            reason: reason.to_string(),
        };

        match (*self, self.width_millis()) {
            (ResampleRule::Months(n), _) => {
                if n == 0 {
                    return Err(invalid("bucket width must be positive"));
                }
                let timestamp = from_millis(millis)?;
                let months = i64::from(timestamp.year() - 1970) * 12 + i64::from(timestamp.month0());
                let bucket = months.div_euclid(i64::from(n)) * i64::from(n);

                let year = i32::try_from(1970 + bucket.div_euclid(12))
                    .map_err(|_| invalid("year out of range"))?;
                let month = (bucket.rem_euclid(12) + 1) as u32;
                let start = NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .ok_or_else(|| invalid("month start out of range"))?;
                Ok(to_millis(start.and_utc()))
            }
            (ResampleRule::Weeks(_), Some(width)) if width > 0 => {
                let shifted = millis - FIRST_MONDAY_OFFSET;
                Ok(shifted.div_euclid(width) * width + FIRST_MONDAY_OFFSET)
            }
            (_, Some(width)) if width > 0 => Ok(millis.div_euclid(width) * width),
            _ => Err(invalid("bucket width must be positive")),
        }
    }
}

impl fmt::Display for ResampleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleRule::Seconds(n) => write!(f, "{}S", n),
            ResampleRule::Minutes(n) => write!(f, "{}min", n),
            ResampleRule::Hours(n) => write!(f, "{}H", n),
            ResampleRule::Days(n) => write!(f, "{}D", n),
            ResampleRule::Weeks(n) => write!(f, "{}W", n),
            ResampleRule::Months(n) => write!(f, "{}M", n),
        }
    }
}

/// Parse pandas-style offset aliases: `"30min"`, `"H"`, `"2D"`, `"W"`, `"M"`
///
/// A missing count means 1. Units are case-insensitive except `M`, which
/// means months; lowercase `m`, `min` and `T` mean minutes.
impl FromStr for ResampleRule {
    type Err = WaterFrameError;

    fn from_str(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = |reason: String| WaterFrameError::InvalidRule {
            rule: text.to_string(),
            reason,
        };

        let unit_start = text
            .char_indices()
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .ok_or_else(|| invalid("missing time unit".to_string()))?;

        let (count, unit) = text.split_at(unit_start);
        let count: u32 = match count.trim() {
            "" => 1,
            digits => digits
                .parse()
                .map_err(|e| invalid(format!("invalid count '{}': {}", digits, e)))?,
        };
        if count == 0 {
            return Err(invalid("count must be positive".to_string()));
        }

        let unit = unit.trim();
        if matches!(unit, "M" | "MS" | "ME") {
            return Ok(ResampleRule::Months(count));
        }

        match unit.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(ResampleRule::Seconds(count)),
            "m" | "t" | "min" | "mins" | "minute" | "minutes" => Ok(ResampleRule::Minutes(count)),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(ResampleRule::Hours(count)),
            "d" | "day" | "days" => Ok(ResampleRule::Days(count)),
            "w" | "week" | "weeks" => Ok(ResampleRule::Weeks(count)),
            "mon" | "month" | "months" => Ok(ResampleRule::Months(count)),
            _ => Err(invalid(format!("unknown time unit '{}'", unit))),
        }
    }
}
