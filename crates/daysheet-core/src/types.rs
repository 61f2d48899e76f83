//! Value types shared by the planner pipeline.

use chrono::{Days, NaiveDate};

use crate::constants::{MAX_HOUR_SPAN, MIN_HOUR_SPAN};
use crate::error::{CoreError, CoreResult};

/// Inclusive range of calendar dates.
///
/// The constructor guarantees `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// ## Summary
    /// Creates a window covering `start..=end`.
    ///
    /// ## Errors
    /// Returns `CoreError::EndBeforeStart` if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a window covering a single day.
    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns whether `date` falls inside the window (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    #[must_use]
    pub fn day_count(&self) -> u64 {
        // end >= start is guaranteed by construction
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    /// Iterates over every date in the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..self.day_count()).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }
}

/// Half-open range of grid hours `[start, end)`.
///
/// The span must be between 8 and 12 hours and the range must fit in one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    /// ## Summary
    /// Creates a validated hour range.
    ///
    /// ## Errors
    /// Returns `HourRangeTooShort` / `HourRangeTooLong` when the span is
    /// outside 8..=12 hours, and `HourOutOfRange` when `end` is past 24.
    pub fn new(start: u32, end: u32) -> CoreResult<Self> {
        let span = i64::from(end) - i64::from(start);
        if span < i64::from(MIN_HOUR_SPAN) {
            return Err(CoreError::HourRangeTooShort {
                span,
                min: MIN_HOUR_SPAN,
            });
        }
        if span > i64::from(MAX_HOUR_SPAN) {
            return Err(CoreError::HourRangeTooLong {
                span,
                max: MAX_HOUR_SPAN,
            });
        }
        if end > 24 {
            return Err(CoreError::HourOutOfRange(end));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Number of hour rows in the range.
    #[must_use]
    pub const fn span(&self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(&self, hour: u32) -> bool {
        (self.start..self.end).contains(&hour)
    }
}
