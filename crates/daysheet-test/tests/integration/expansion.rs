//! Expansion of parsed VEVENTs into display-zone occurrences.

use chrono::{NaiveTime, Timelike};
use daysheet_test::component::planner::expand::{ExpandOutcome, SkipReason};
use daysheet_test::component::planner::occurrence::When;

use crate::helpers::{DISPLAY_ZONE, date, expand, vevent, window};

fn start_time(when: &When) -> NaiveTime {
    when.as_datetime().unwrap().time()
}

#[test_log::test]
fn daily_standup_lands_once_on_a_single_day() {
    let event = vevent(
        "standup@example.com",
        "Standup",
        &[
            "DTSTART;TZID=America/Chicago:20260105T090000",
            "DTEND;TZID=America/Chicago:20260105T093000",
            "RRULE:FREQ=DAILY",
        ],
    );

    let outcome = expand(&event, window(date(2026, 1, 7), date(2026, 1, 7)));

    let occurrences = outcome.occurrences();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].title, "Standup");
    assert_eq!(occurrences[0].date, date(2026, 1, 7));
    assert_eq!(start_time(&occurrences[0].start), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(
        occurrences[0].timed_duration(),
        Some(chrono::TimeDelta::minutes(30))
    );
}

#[test_log::test]
fn expanding_twice_gives_the_same_list() {
    let event = vevent(
        "gym@example.com",
        "Gym",
        &[
            "DTSTART;TZID=America/Chicago:20260105T063000",
            "DTEND;TZID=America/Chicago:20260105T073000",
            "RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR",
        ],
    );
    let range = window(date(2026, 1, 1), date(2026, 1, 31));

    let first = expand(&event, range).into_occurrences();
    let second = expand(&event, range).into_occurrences();

    assert_eq!(first, second);
    // 12 Mon/Wed/Fri dates from Jan 5 through Jan 30
    assert_eq!(first.len(), 12);
    assert!(first.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test_log::test]
fn windows_zone_name_resolves_like_iana() {
    let event = vevent(
        "review@example.com",
        "Review",
        &[
            "DTSTART;TZID=Central Standard Time:20260105T140000",
            "DTEND;TZID=Central Standard Time:20260105T150000",
        ],
    );

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 5)));

    let occurrences = outcome.occurrences();
    assert_eq!(occurrences.len(), 1);
    let start = occurrences[0].start.as_datetime().unwrap();
    assert_eq!(start.timezone(), DISPLAY_ZONE);
    assert_eq!(start.hour(), 14);
}

#[test_log::test]
fn floating_time_is_read_as_utc() {
    let event = vevent(
        "floating@example.com",
        "Floating",
        &["DTSTART:20260105T150000", "DTEND:20260105T160000"],
    );

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 5)));

    // 15:00 UTC is 09:00 in Chicago in January
    let occurrences = outcome.occurrences();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(start_time(&occurrences[0].start), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
}

#[test_log::test]
fn utc_instant_crossing_midnight_files_under_display_date() {
    let event = vevent(
        "late@example.com",
        "Late call",
        &["DTSTART:20260106T030000Z", "DTEND:20260106T040000Z"],
    );

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 5)));

    let occurrences = outcome.occurrences();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].date, date(2026, 1, 5));
    assert_eq!(occurrences[0].start.as_datetime().unwrap().hour(), 21);
}

#[test_log::test]
fn all_day_event_keeps_its_date() {
    let event = vevent(
        "holiday@example.com",
        "Holiday",
        &["DTSTART;VALUE=DATE:20260106", "DTEND;VALUE=DATE:20260107"],
    );

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 7)));

    let occurrences = outcome.occurrences();
    assert_eq!(occurrences.len(), 1);
    assert!(occurrences[0].is_all_day());
    assert_eq!(occurrences[0].date, date(2026, 1, 6));
}

#[test_log::test]
fn broken_rule_degrades_to_the_first_instance() {
    let event = vevent(
        "broken@example.com",
        "Broken",
        &[
            "DTSTART;TZID=America/Chicago:20260105T100000",
            "RRULE:FREQ=SOMETIMES",
        ],
    );

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 9)));

    assert!(matches!(outcome, ExpandOutcome::Degraded { .. }));
    assert_eq!(outcome.occurrences().len(), 1);
    assert_eq!(outcome.occurrences()[0].date, date(2026, 1, 5));
}

#[test_log::test]
fn event_without_start_is_skipped() {
    let event = vevent("nostart@example.com", "Nowhere", &[]);

    let outcome = expand(&event, window(date(2026, 1, 5), date(2026, 1, 9)));

    assert!(matches!(outcome, ExpandOutcome::Skipped(SkipReason::MissingStart)));
    assert!(outcome.occurrences().is_empty());
}
