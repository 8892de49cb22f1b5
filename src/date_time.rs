// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `DateTime`, a UTC instant in the OPC-UA
//! time domain: 100 nanosecond ticks since January 1, 1601.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{Duration, SecondsFormat, TimeZone, Utc};

use crate::{Error, UaNullable};

/// Ticks per second. One tick is 100 nanoseconds.
const TICKS_PER_SECOND: i64 = 10_000_000;

static MIN_DATE_TIME: LazyLock<chrono::DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());

static MAX_DATE_TIME: LazyLock<chrono::DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());

/// An instant in time, at 100 nanosecond resolution. The null value is the
/// epoch itself, January 1, 1601. Values outside of the representable
/// range are clamped to it, both when constructed and when decoded.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct DateTime {
    date_time: chrono::DateTime<Utc>,
}

impl UaNullable for DateTime {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(date_time: chrono::DateTime<Utc>) -> Self {
        let date_time = date_time.clamp(*MIN_DATE_TIME, *MAX_DATE_TIME);
        // Truncate to the resolution of a tick
        let remainder = date_time.timestamp_subsec_nanos() % 100;
        Self {
            date_time: date_time - Duration::nanoseconds(remainder as i64),
        }
    }
}

impl From<DateTime> for chrono::DateTime<Utc> {
    fn from(value: DateTime) -> Self {
        value.date_time
    }
}

impl FromStr for DateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from(dt.with_timezone(&Utc)))
            .map_err(|e| Error::encoding(format!("Cannot parse date time {s}: {e}")))
    }
}

impl DateTime {
    /// The current time.
    pub fn now() -> DateTime {
        Self::from(Utc::now())
    }

    /// The null date time, i.e. the epoch, January 1, 1601.
    pub fn null() -> DateTime {
        Self {
            date_time: *MIN_DATE_TIME,
        }
    }

    /// The earliest representable time. Same instant as [`DateTime::null`].
    pub fn min_value() -> DateTime {
        Self::null()
    }

    /// The latest representable time, December 31, 9999.
    pub fn max_value() -> DateTime {
        Self {
            date_time: *MAX_DATE_TIME,
        }
    }

    /// Test if this is the null date time.
    pub fn is_null(&self) -> bool {
        self.date_time == *MIN_DATE_TIME
    }

    /// Create a date time from a number of ticks since the epoch,
    /// clamping out of range values.
    pub fn from_ticks(ticks: i64) -> DateTime {
        let ticks = ticks.max(0);
        Self::from(
            *MIN_DATE_TIME
                + Duration::seconds(ticks / TICKS_PER_SECOND)
                + Duration::nanoseconds((ticks % TICKS_PER_SECOND) * 100),
        )
    }

    /// The number of 100 nanosecond ticks since the epoch.
    pub fn ticks(&self) -> i64 {
        let duration = self.date_time.signed_duration_since(*MIN_DATE_TIME);
        duration.num_seconds() * TICKS_PER_SECOND + (duration.subsec_nanos() as i64) / 100
    }

    /// Format as an ISO 8601 / RFC 3339 UTC timestamp, trailing zero
    /// fraction digits trimmed.
    pub fn to_rfc3339(&self) -> String {
        self.date_time
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}
