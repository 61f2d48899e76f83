//! Resolution of iCalendar time values into absolute instants.

pub mod timezone;
