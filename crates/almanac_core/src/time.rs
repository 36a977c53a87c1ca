//! Minute-resolution timestamps.
//!
//! The sweep advances one minute at a time, so every timestamp inside the
//! engine is a whole number of minutes since the Unix epoch. Conversion to
//! and from `chrono` happens only at the edges.

use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Whole minutes since 1970-01-01T00:00Z.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Minute(pub i64);

impl Minute {
    /// Truncate a UTC instant to its minute.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp().div_euclid(60))
    }

    /// UTC instant at the start of this minute.
    ///
    /// Minutes beyond chrono's representable range clamp to its bounds.
    pub fn to_datetime(self) -> DateTime<Utc> {
        self.0
            .checked_mul(60)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(if self.0 < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            })
    }

    /// Parse `YYYY-MM-DDTHH:MM[:SS]Z`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD`
    /// (midnight UTC).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::from_datetime(naive.and_utc()));
            }
        }
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self::from_datetime(naive.and_utc()))
    }

    pub const fn offset(self, minutes: i64) -> Self {
        Self(self.0 + minutes)
    }
}

impl Add<i64> for Minute {
    type Output = Minute;

    fn add(self, rhs: i64) -> Minute {
        Minute(self.0 + rhs)
    }
}

impl Sub<i64> for Minute {
    type Output = Minute;

    fn sub(self, rhs: i64) -> Minute {
        Minute(self.0 - rhs)
    }
}

impl Sub<Minute> for Minute {
    type Output = i64;

    fn sub(self, rhs: Minute) -> i64 {
        self.0 - rhs.0
    }
}

impl Display for Minute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M UTC"))
    }
}

impl From<DateTime<Utc>> for Minute {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Inclusive range of minutes, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinuteRange {
    pub start: Minute,
    pub end: Minute,
}

impl MinuteRange {
    /// Build a range; `None` when `end < start`.
    pub fn new(start: Minute, end: Minute) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Range covering a single minute.
    pub const fn single(at: Minute) -> Self {
        Self { start: at, end: at }
    }

    /// Number of minutes in the range (both ends included).
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// An inclusive range always holds at least one minute.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, at: Minute) -> bool {
        at >= self.start && at <= self.end
    }

    /// Grow the range by `margin` minutes on both sides.
    pub fn expand(&self, margin: i64) -> Self {
        Self {
            start: self.start - margin,
            end: self.end + margin,
        }
    }

    /// Every minute in order.
    pub fn iter(&self) -> impl Iterator<Item = Minute> + use<> {
        (self.start.0..=self.end.0).map(Minute)
    }

    /// Consecutive sub-ranges of at most `len` minutes covering the range
    /// in order. A zero `len` is treated as one.
    pub fn chunks(&self, len: usize) -> impl Iterator<Item = MinuteRange> + use<> {
        let len = len.max(1);
        let end = self.end;
        (self.start.0..=self.end.0)
            .step_by(len)
            .map(move |s| MinuteRange {
                start: Minute(s),
                end: Minute((s + len as i64 - 1).min(end.0)),
            })
    }
}

impl Display for MinuteRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}
