//! Concrete, display-zone occurrences produced by expansion.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Start or end of an occurrence: a bare date for all-day events, or an
/// instant already converted to the display zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum When {
    Date(NaiveDate),
    DateTime(DateTime<Tz>),
}

impl When {
    #[must_use]
    pub const fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Calendar date in the display zone.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(dt) => dt.date_naive(),
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<Tz>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            Self::Date(_) => None,
        }
    }

    /// Absolute instant used for ordering. Bare dates count as local midnight.
    #[must_use]
    pub fn sort_instant(&self, tz: Tz) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&Utc),
            Self::Date(date) => local_midnight(tz, *date)
                .map_or_else(|| date.and_time(NaiveTime::MIN).and_utc(), |dt| dt.with_timezone(&Utc)),
        }
    }
}

/// One dated instance of an event, filed under `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub start: When,
    pub end: Option<When>,
    pub title: String,
    pub date: NaiveDate,
}

impl Occurrence {
    #[must_use]
    pub const fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Length of a timed occurrence with a timed end.
    #[must_use]
    pub fn timed_duration(&self) -> Option<TimeDelta> {
        let start = self.start.as_datetime()?;
        let end = self.end.as_ref()?.as_datetime()?;
        Some(end.signed_duration_since(*start))
    }
}

/// ## Summary
/// First instant of `date` in `tz`.
///
/// When midnight falls inside a DST gap the first valid instant an hour
/// later is used instead.
#[must_use]
pub fn local_midnight(tz: Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + TimeDelta::hours(1))).earliest())
}
