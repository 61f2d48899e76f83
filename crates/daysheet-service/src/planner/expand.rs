//! Occurrence expansion: one event definition plus a date window in, the
//! concrete occurrences inside that window out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use daysheet_core::types::DateWindow;
use rrule::{RRule, Unvalidated};
use thiserror::Error;

use super::occurrence::{Occurrence, When, local_midnight};
use super::recurrence::{EventTime, RawEventDefinition};

/// Why an event produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingStart,
    MissingTitle,
}

/// Why a recurring event was expanded as a single event instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid recurrence rule: {0}")]
    Invalid(String),

    #[error("no local midnight for {0}")]
    Anchor(NaiveDate),

    #[error("window is outside the supported date range")]
    Window,
}

/// Result of expanding one event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    Expanded(Vec<Occurrence>),
    /// The recurrence rule could not be evaluated; the single-event rule was
    /// applied instead.
    Degraded {
        occurrences: Vec<Occurrence>,
        reason: RuleError,
    },
    Skipped(SkipReason),
}

impl ExpandOutcome {
    #[must_use]
    pub fn occurrences(&self) -> &[Occurrence] {
        match self {
            Self::Expanded(occurrences) | Self::Degraded { occurrences, .. } => occurrences,
            Self::Skipped(_) => &[],
        }
    }

    #[must_use]
    pub fn into_occurrences(self) -> Vec<Occurrence> {
        match self {
            Self::Expanded(occurrences) | Self::Degraded { occurrences, .. } => occurrences,
            Self::Skipped(_) => Vec::new(),
        }
    }
}

/// Expands event definitions into occurrences in a fixed display zone.
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    tz: Tz,
}

impl Expander {
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// ## Summary
    /// Expands `event` into the occurrences whose date lies in `window`.
    ///
    /// Output depends only on the event, the window and the display zone.
    #[must_use]
    pub fn expand(&self, event: &RawEventDefinition, window: DateWindow) -> ExpandOutcome {
        let Some(start) = event.start else {
            tracing::debug!(uid = event.uid.as_deref(), "Skipping event without start");
            return ExpandOutcome::Skipped(SkipReason::MissingStart);
        };
        let Some(title) = event.title.as_deref() else {
            tracing::debug!(uid = event.uid.as_deref(), "Skipping event without title");
            return ExpandOutcome::Skipped(SkipReason::MissingTitle);
        };

        let Some(rule) = event.rrule.as_deref() else {
            return ExpandOutcome::Expanded(self.expand_single(start, event.end, title, window));
        };

        match self.expand_rule(rule, event, start, title, window) {
            Ok(occurrences) => ExpandOutcome::Expanded(occurrences),
            Err(reason) => {
                tracing::debug!(uid = event.uid.as_deref(), %reason, "Falling back to single event");
                ExpandOutcome::Degraded {
                    occurrences: self.expand_single(start, event.end, title, window),
                    reason,
                }
            }
        }
    }

    fn when(&self, time: EventTime) -> When {
        match time {
            EventTime::Date(date) => When::Date(date),
            EventTime::Instant(instant) => When::DateTime(instant.with_timezone(&self.tz)),
        }
    }

    fn expand_single(
        &self,
        start: EventTime,
        end: Option<EventTime>,
        title: &str,
        window: DateWindow,
    ) -> Vec<Occurrence> {
        let start = self.when(start);
        let date = start.date();
        if !window.contains(date) {
            return Vec::new();
        }

        vec![Occurrence {
            start,
            end: end.map(|end| self.when(end)),
            title: title.to_owned(),
            date,
        }]
    }

    fn expand_rule(
        &self,
        rule_text: &str,
        event: &RawEventDefinition,
        start: EventTime,
        title: &str,
        window: DateWindow,
    ) -> Result<Vec<Occurrence>, RuleError> {
        let all_day = matches!(start, EventTime::Date(_));
        let duration = series_duration(start, event.end);

        let anchor = self.rule_time(start)?;
        let (rule_text, until) = self.split_until(rule_text.trim().trim_start_matches("RRULE:"))?;
        let mut rule = rule_text
            .parse::<RRule<Unvalidated>>()
            .map_err(|err| RuleError::Invalid(err.to_string()))?;
        if let Some(until) = until {
            rule = rule.until(until.with_timezone(&rrule::Tz::UTC));
        }
        let rule_set = rule
            .build(anchor)
            .map_err(|err| RuleError::Invalid(err.to_string()))?;

        let exdates = event
            .exdates
            .iter()
            .map(|exdate| self.rule_time(*exdate))
            .collect::<Result<Vec<_>, _>>()?;

        let search_start = local_midnight(self.tz, window.start())
            .ok_or(RuleError::Anchor(window.start()))?;
        let after_end = window.end().succ_opt().ok_or(RuleError::Window)?;
        let search_end = local_midnight(self.tz, after_end).ok_or(RuleError::Anchor(after_end))?;
        let rule_tz = rrule::Tz::Tz(self.tz);

        let result = rule_set
            .set_exdates(exdates)
            .after((search_start - TimeDelta::seconds(1)).with_timezone(&rule_tz))
            .before((search_end - TimeDelta::seconds(1)).with_timezone(&rule_tz))
            .all(u16::MAX);
        if result.limited {
            tracing::debug!(uid = event.uid.as_deref(), "Recurrence expansion hit the instance limit");
        }

        let occurrences: Vec<Occurrence> = result
            .dates
            .into_iter()
            .filter_map(|generated| {
                let local = generated.with_timezone(&self.tz);
                let (start, end) = if all_day {
                    let date = local.date_naive();
                    let end = duration
                        .and_then(|d| date.checked_add_signed(d))
                        .map(When::Date);
                    (When::Date(date), end)
                } else {
                    let end = duration
                        .and_then(|d| local.checked_add_signed(d))
                        .map(When::DateTime);
                    (When::DateTime(local), end)
                };
                let date = start.date();
                window.contains(date).then(|| Occurrence {
                    start,
                    end,
                    title: title.to_owned(),
                    date,
                })
            })
            .collect();

        tracing::trace!(
            uid = event.uid.as_deref(),
            count = occurrences.len(),
            "Expanded recurring event"
        );
        Ok(occurrences)
    }

    /// ## Summary
    /// Removes `UNTIL` from the rule text and resolves it to a UTC instant.
    ///
    /// A UTC value is taken as is. A floating date-time is read in the
    /// display zone. A bare date bounds the series at the last second of
    /// that date in the display zone.
    ///
    /// ## Errors
    /// Returns `RuleError::Invalid` if the value is not a date or date-time.
    fn split_until(&self, rule_text: &str) -> Result<(String, Option<DateTime<Utc>>), RuleError> {
        let mut until = None;
        let mut parts = Vec::new();
        for part in rule_text.split(';') {
            match part.split_once('=') {
                Some((name, value)) if name.trim().eq_ignore_ascii_case("UNTIL") => {
                    until = Some(self.until_instant(value.trim())?);
                }
                _ => parts.push(part),
            }
        }
        Ok((parts.join(";"), until))
    }

    fn until_instant(&self, value: &str) -> Result<DateTime<Utc>, RuleError> {
        let invalid = || RuleError::Invalid(format!("invalid UNTIL value {value}"));

        if let Some(utc) = value.strip_suffix(['Z', 'z']) {
            return NaiveDateTime::parse_from_str(&utc.to_ascii_uppercase(), "%Y%m%dT%H%M%S")
                .map(|naive| naive.and_utc())
                .map_err(|_err| invalid());
        }
        if value.contains(['T', 't']) {
            let naive =
                NaiveDateTime::parse_from_str(&value.to_ascii_uppercase(), "%Y%m%dT%H%M%S").map_err(|_err| invalid())?;
            return self
                .tz
                .from_local_datetime(&naive)
                .earliest()
                .or_else(|| self.tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(invalid);
        }

        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_err| invalid())?;
        let next = date.succ_opt().ok_or(RuleError::Window)?;
        let next_midnight = local_midnight(self.tz, next).ok_or(RuleError::Anchor(next))?;
        Ok((next_midnight - TimeDelta::seconds(1)).with_timezone(&Utc))
    }

    /// Converts a feed time into the rule's zone; bare dates become local midnight.
    fn rule_time(&self, time: EventTime) -> Result<DateTime<rrule::Tz>, RuleError> {
        let rule_tz = rrule::Tz::Tz(self.tz);
        match time {
            EventTime::Instant(instant) => Ok(instant.with_timezone(&rule_tz)),
            EventTime::Date(date) => local_midnight(self.tz, date)
                .map(|midnight| midnight.with_timezone(&rule_tz))
                .ok_or(RuleError::Anchor(date)),
        }
    }
}

/// Length of each instance, known only when start and end share a kind.
///
/// A zero length counts as unknown.
fn series_duration(start: EventTime, end: Option<EventTime>) -> Option<TimeDelta> {
    let duration = match (start, end?) {
        (EventTime::Date(start), EventTime::Date(end)) => TimeDelta::days((end - start).num_days()),
        (EventTime::Instant(start), EventTime::Instant(end)) => end - start,
        _ => return None,
    };
    (!duration.is_zero()).then_some(duration)
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
