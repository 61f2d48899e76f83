//! Typed iCalendar property values (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Form of a DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Wall-clock time with no zone, e.g. `19980118T230000`.
    Floating,
    /// Absolute instant, marked with a `Z` suffix.
    Utc,
    /// Local time qualified by a `TZID` parameter.
    Zoned { tzid: String },
}

/// DATE-TIME value: a wall-clock reading plus the form that says how to
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub local: NaiveDateTime,
    pub form: DateTimeForm,
}

impl DateTime {
    #[must_use]
    pub const fn floating(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Floating,
        }
    }

    #[must_use]
    pub const fn utc(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Utc,
        }
    }

    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            local,
            form: DateTimeForm::Zoned { tzid: tzid.into() },
        }
    }

    /// Returns the TZID if this is a zoned value.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Floating | DateTimeForm::Utc => None,
        }
    }

    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }
}

/// A parsed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime),
    /// Comma-separated DATE list (EXDATE/RDATE with `VALUE=DATE`).
    DateList(Vec<NaiveDate>),
    /// Comma-separated DATE-TIME list.
    DateTimeList(Vec<DateTime>),
    Duration(TimeDelta),
    /// RRULE text, kept verbatim for the recurrence engine.
    Recur(String),
    /// Value that was not understood; the raw text is preserved.
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&str> {
        match self {
            Self::Recur(s) => Some(s),
            _ => None,
        }
    }
}
