//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use chrono::{NaiveDate, TimeDelta};

use super::{DateTime, Parameter, Value};

/// A raw content line as split from iCalendar text, before value typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }
}

/// A parsed iCalendar property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    /// Original raw value string.
    pub raw_value: String,
}

impl Property {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(value.clone()),
            raw_value: value,
        }
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&NaiveDate> {
        self.value.as_date()
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime> {
        self.value.as_datetime()
    }

    #[must_use]
    pub const fn as_duration(&self) -> Option<TimeDelta> {
        self.value.as_duration()
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&str> {
        self.value.as_recur()
    }
}

/// Property names read by the planner.
pub mod names {
    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const DURATION: &str = "DURATION";
    pub const EXDATE: &str = "EXDATE";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const RRULE: &str = "RRULE";
    pub const SUMMARY: &str = "SUMMARY";
    pub const UID: &str = "UID";
}
