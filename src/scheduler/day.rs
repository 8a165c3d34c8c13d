//! Day keys and midnight arithmetic.
//!
//! A [`DayBoundary`] decides which clock defines "today": a fixed UTC
//! offset (the backend's content day is UTC+9) or the host's local
//! timezone. Everything here is pure time arithmetic and recomputed from
//! scratch on every call.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Milliseconds in a 24-hour day.
pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Source of "now". Injected so tests can pin time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The system wall clock.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// A calendar day under a chosen timezone reference, shown as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

/// Which clock defines the calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// Fixed offset from UTC, independent of the host timezone.
    Fixed(FixedOffset),
    /// The host's local timezone.
    Local,
}

impl DayBoundary {
    /// Fixed boundary at `offset_minutes` east of UTC.
    ///
    /// Returns `None` when the offset is not a valid UTC offset.
    pub fn fixed_minutes(offset_minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_minutes.checked_mul(60)?).map(Self::Fixed)
    }

    /// Day key of `now` under this boundary.
    pub fn date_key(&self, now: DateTime<Utc>) -> DayKey {
        match self {
            Self::Fixed(offset) => date_key(now, *offset),
            Self::Local => DayKey(now.with_timezone(&Local).date_naive()),
        }
    }

    /// The first instant strictly after `now` that starts a new day.
    pub fn next_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let next = match self {
            Self::Fixed(offset) => next_midnight_in(now, offset),
            Self::Local => next_midnight_in(now, &Local),
        };
        next.unwrap_or_else(|| now + Duration::milliseconds(DAY_MS as i64))
    }

    /// Milliseconds from `now` until [`next_midnight`](Self::next_midnight).
    ///
    /// For a fixed offset the result lies in `0..=DAY_MS`; exactly at
    /// midnight it is the full day. Local days around DST changes may be
    /// an hour shorter or longer.
    pub fn millis_until_next_midnight(&self, now: DateTime<Utc>) -> u64 {
        millis_between(now, self.next_midnight(now))
    }

    /// Compare the last loaded day against `now`.
    ///
    /// Returns today's key when it differs from `last_key`. Nothing has
    /// changed while no content has been loaded yet.
    pub fn poll_for_date_change(
        &self,
        last_key: Option<DayKey>,
        now: DateTime<Utc>,
    ) -> Option<DayKey> {
        let last = last_key?;
        let today = self.date_key(now);
        (today != last).then_some(today)
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(offset) => write!(f, "UTC{offset}"),
            Self::Local => f.write_str("local time"),
        }
    }
}

/// Day key of `now` at a fixed UTC offset.
pub fn date_key(now: DateTime<Utc>, offset: FixedOffset) -> DayKey {
    DayKey(now.with_timezone(&offset).date_naive())
}

/// Milliseconds from `now` until the next midnight at a fixed UTC offset.
pub fn millis_until_next_midnight(now: DateTime<Utc>, offset: FixedOffset) -> u64 {
    DayBoundary::Fixed(offset).millis_until_next_midnight(now)
}

fn next_midnight_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
    let tomorrow = now.with_timezone(tz).date_naive().succ_opt()?;
    let midnight = tomorrow.and_hms_opt(0, 0, 0)?;
    // Zones that skip midnight for DST start the day at the first valid instant.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
