//! Calendar and instant values stored on the heap.
//!
//! Temporal objects are mutable heap cells (like any other reference object),
//! so two fields may alias one date. The payload itself is a plain `chrono`
//! value with no heap references.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fmt;

/// Payload of a temporal heap object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemporalValue {
    /// Calendar date (year, month, day)
    Date(NaiveDate),
    /// Point in time
    Timestamp(DateTime<Utc>),
}

impl TemporalValue {
    /// Calendar date, `None` if the components are out of range
    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::Date)
    }

    /// Timestamp from milliseconds since the Unix epoch
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::Timestamp)
    }

    /// Milliseconds since the Unix epoch (dates are taken at midnight UTC)
    pub fn epoch_millis(&self) -> i64 {
        match self {
            Self::Date(d) => d.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp_millis()),
            Self::Timestamp(t) => t.timestamp_millis(),
        }
    }

    /// Rebuild the value from its numeric components.
    ///
    /// The result is equal to `self` but constructed from year/month/day or
    /// from the epoch tick count rather than copied.
    pub fn rebuild(&self) -> Self {
        match self {
            Self::Date(d) => Self::Date(NaiveDate::from_ymd_opt(d.year(), d.month(), d.day()).unwrap_or(*d)),
            Self::Timestamp(t) => Self::Timestamp(
                DateTime::from_timestamp(t.timestamp(), t.timestamp_subsec_nanos()).unwrap_or(*t),
            ),
        }
    }

    /// Short kind name
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}
