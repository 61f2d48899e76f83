//! Helper functions for extracting event definitions from VEVENT components.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use daysheet_rfc::rfc::ical::core::{Component, DateTime as IcalDateTime, Property, Value, names};
use daysheet_rfc::rfc::ical::expand::timezone::TimeZoneResolver;

/// A point in time as written in the feed: a bare date or an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
}

/// One VEVENT reduced to the fields the planner reads.
///
/// Extraction never fails; missing or unreadable fields are `None` and the
/// expander decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventDefinition {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub start: Option<EventTime>,
    /// From DTEND, or DTSTART + DURATION.
    pub end: Option<EventTime>,
    /// RRULE text, without the property name.
    pub rrule: Option<String>,
    pub recurrence_id: Option<EventTime>,
    /// Excluded instances: EXDATE values plus any overridden instances.
    pub exdates: Vec<EventTime>,
}

impl RawEventDefinition {
    /// ## Summary
    /// Extracts an event definition from a VEVENT component.
    ///
    /// Zoned times are converted to UTC through `resolver`; floating times
    /// and times in an unknown zone are read as UTC.
    #[must_use]
    pub fn from_component(component: &Component, resolver: &mut TimeZoneResolver) -> Self {
        tracing::trace!(
            uid = component.uid(),
            property_count = component.properties.len(),
            "Extracting event definition"
        );

        let start = component
            .get_property(names::DTSTART)
            .and_then(|prop| event_time(prop, resolver));
        let end = extract_end(component, start, resolver);
        let recurrence_id = component
            .get_property(names::RECURRENCE_ID)
            .and_then(|prop| event_time(prop, resolver));

        Self {
            uid: component.uid().map(str::to_owned),
            title: component
                .summary()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned),
            start,
            end,
            rrule: component
                .get_property(names::RRULE)
                .and_then(Property::as_recur)
                .map(str::to_owned),
            recurrence_id,
            exdates: extract_exdates(component, resolver),
        }
    }

    #[must_use]
    pub const fn is_override(&self) -> bool {
        self.recurrence_id.is_some()
    }
}

fn event_time(prop: &Property, resolver: &mut TimeZoneResolver) -> Option<EventTime> {
    match &prop.value {
        Value::Date(date) => Some(EventTime::Date(*date)),
        Value::DateTime(dt) => Some(EventTime::Instant(instant_of(dt, resolver))),
        _ => {
            tracing::trace!(property = %prop.name, raw = %prop.raw_value, "Unreadable date value");
            None
        }
    }
}

fn instant_of(dt: &IcalDateTime, resolver: &mut TimeZoneResolver) -> DateTime<Utc> {
    resolver.to_utc(dt).unwrap_or_else(|err| {
        tracing::debug!(%err, "Reading date-time as UTC");
        dt.local.and_utc()
    })
}

/// Reads DTEND, or derives the end from DURATION when DTEND is absent.
fn extract_end(
    component: &Component,
    start: Option<EventTime>,
    resolver: &mut TimeZoneResolver,
) -> Option<EventTime> {
    if let Some(dtend) = component.get_property(names::DTEND) {
        return event_time(dtend, resolver);
    }

    let duration = component.get_property(names::DURATION)?.as_duration()?;
    match start? {
        EventTime::Instant(instant) => instant.checked_add_signed(duration).map(EventTime::Instant),
        EventTime::Date(date) => date
            .checked_add_signed(TimeDelta::days(duration.num_days()))
            .map(EventTime::Date),
    }
}

fn extract_exdates(component: &Component, resolver: &mut TimeZoneResolver) -> Vec<EventTime> {
    let mut exdates = Vec::new();
    for prop in component.get_properties(names::EXDATE) {
        match &prop.value {
            Value::DateList(dates) => exdates.extend(dates.iter().copied().map(EventTime::Date)),
            Value::DateTimeList(values) => {
                for value in values {
                    exdates.push(EventTime::Instant(instant_of(value, resolver)));
                }
            }
            _ => tracing::trace!(raw = %prop.raw_value, "Ignoring unreadable EXDATE"),
        }
    }
    exdates
}
