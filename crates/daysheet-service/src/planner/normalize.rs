//! Feed normalization: raw feed blobs in, one window-filtered, sorted list of
//! occurrences out.
//!
//! Failures are absorbed per feed and per event and recorded in the report;
//! nothing here returns an error.

use std::collections::HashMap;

use chrono_tz::Tz;
use daysheet_core::types::DateWindow;
use daysheet_rfc::error::RfcError;
use daysheet_rfc::rfc::ical::core::ICalendar;
use daysheet_rfc::rfc::ical::expand::timezone::TimeZoneResolver;
use daysheet_rfc::rfc::ical::parse::parse_bytes;

use super::expand::{ExpandOutcome, Expander};
use super::occurrence::Occurrence;
use super::recurrence::{EventTime, RawEventDefinition};

/// Why a whole feed contributed nothing.
#[derive(Debug)]
pub enum FeedSkip {
    /// The transport delivered no data.
    Absent,
    Unparseable(RfcError),
}

/// What happened to one feed, in input order.
#[derive(Debug)]
pub enum FeedOutcome {
    Parsed {
        events: usize,
        occurrences: usize,
        /// Recurring events expanded as single events.
        degraded: usize,
        /// Events without a start or title.
        skipped: usize,
    },
    Skipped(FeedSkip),
}

impl FeedOutcome {
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

#[derive(Debug)]
pub struct Normalized {
    pub occurrences: Vec<Occurrence>,
    pub report: Vec<FeedOutcome>,
}

/// Turns feed blobs into sorted occurrences in one display zone.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    tz: Tz,
}

impl Normalizer {
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// ## Summary
    /// Normalizes `blobs` and returns only the occurrences.
    #[must_use]
    pub fn normalize(&self, blobs: &[Option<Vec<u8>>], window: DateWindow) -> Vec<Occurrence> {
        self.normalize_with_report(blobs, window).occurrences
    }

    /// ## Summary
    /// Parses each blob independently, expands every event against `window`
    /// and merges the results.
    ///
    /// Occurrences are ordered by display instant, with bare dates counted as
    /// local midnight. The sort is stable, so equal instants keep feed order
    /// and then document order.
    #[must_use]
    #[tracing::instrument(skip_all, fields(feeds = blobs.len(), start = %window.start(), end = %window.end()))]
    pub fn normalize_with_report(&self, blobs: &[Option<Vec<u8>>], window: DateWindow) -> Normalized {
        let expander = Expander::new(self.tz);
        let mut occurrences = Vec::new();
        let mut report = Vec::with_capacity(blobs.len());

        for (feed, blob) in blobs.iter().enumerate() {
            let outcome = match blob {
                None => {
                    tracing::warn!(feed, "Feed unavailable, skipping");
                    FeedOutcome::Skipped(FeedSkip::Absent)
                }
                Some(bytes) => match parse_bytes(bytes) {
                    Ok(calendar) => {
                        tracing::trace!(feed, prodid = calendar.prodid(), "Feed parsed");
                        expand_calendar(&expander, &calendar, window, &mut occurrences)
                    }
                    Err(err) => {
                        tracing::warn!(feed, %err, "Feed is not a valid calendar, skipping");
                        FeedOutcome::Skipped(FeedSkip::Unparseable(err.into()))
                    }
                },
            };
            tracing::debug!(feed, ?outcome, "Feed processed");
            report.push(outcome);
        }

        occurrences.sort_by_key(|occurrence| occurrence.start.sort_instant(self.tz));
        tracing::debug!(
            count = occurrences.len(),
            skipped_feeds = report.iter().filter(|outcome| outcome.is_skipped()).count(),
            "Normalized occurrences"
        );

        Normalized {
            occurrences,
            report,
        }
    }
}

fn expand_calendar(
    expander: &Expander,
    calendar: &ICalendar,
    window: DateWindow,
    out: &mut Vec<Occurrence>,
) -> FeedOutcome {
    let mut resolver = TimeZoneResolver::new();
    let definitions: Vec<RawEventDefinition> = calendar
        .events()
        .map(|component| RawEventDefinition::from_component(component, &mut resolver))
        .collect();
    let overrides = overridden_instances(&definitions);

    let before = out.len();
    let mut degraded = 0;
    let mut skipped = 0;
    for definition in &definitions {
        let outcome = match overrides_for(definition, &overrides) {
            Some(instances) => {
                let mut master = definition.clone();
                master.exdates.extend_from_slice(instances);
                expander.expand(&master, window)
            }
            None => expander.expand(definition, window),
        };

        match &outcome {
            ExpandOutcome::Degraded { .. } => degraded += 1,
            ExpandOutcome::Skipped(_) => skipped += 1,
            ExpandOutcome::Expanded(_) => {}
        }
        out.extend(outcome.into_occurrences());
    }

    FeedOutcome::Parsed {
        events: definitions.len(),
        occurrences: out.len() - before,
        degraded,
        skipped,
    }
}

/// Instances replaced by a separate VEVENT, keyed by the master's UID.
fn overridden_instances(definitions: &[RawEventDefinition]) -> HashMap<&str, Vec<EventTime>> {
    let mut overrides: HashMap<&str, Vec<EventTime>> = HashMap::new();
    for definition in definitions {
        if let (Some(uid), Some(instance)) = (definition.uid.as_deref(), definition.recurrence_id) {
            overrides.entry(uid).or_default().push(instance);
        }
    }
    overrides
}

fn overrides_for<'a>(
    definition: &RawEventDefinition,
    overrides: &'a HashMap<&str, Vec<EventTime>>,
) -> Option<&'a [EventTime]> {
    if definition.is_override() || definition.rrule.is_none() {
        return None;
    }
    overrides
        .get(definition.uid.as_deref()?)
        .map(Vec::as_slice)
}
