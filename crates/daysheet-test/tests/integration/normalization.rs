//! Merging several feeds into one ordered occurrence list.

use daysheet_test::component::planner::normalize::{FeedOutcome, FeedSkip, Normalizer};
use daysheet_test::component::planner::occurrence::Occurrence;

use crate::helpers::{DISPLAY_ZONE, date, feed, vevent, window};

fn titles(occurrences: &[Occurrence]) -> Vec<&str> {
    occurrences.iter().map(|o| o.title.as_str()).collect()
}

#[test_log::test]
fn absent_feed_leaves_the_others_intact() {
    let work = feed(&[vevent(
        "a@work",
        "Planning",
        &[
            "DTSTART;TZID=America/Chicago:20260105T100000",
            "DTEND;TZID=America/Chicago:20260105T110000",
        ],
    )]);
    let home = feed(&[vevent(
        "b@home",
        "Dinner",
        &[
            "DTSTART;TZID=America/Chicago:20260105T180000",
            "DTEND;TZID=America/Chicago:20260105T190000",
        ],
    )]);

    let normalized = Normalizer::new(DISPLAY_ZONE)
        .normalize_with_report(&[work, None, home], window(date(2026, 1, 5), date(2026, 1, 5)));

    assert_eq!(titles(&normalized.occurrences), vec!["Planning", "Dinner"]);
    assert_eq!(normalized.report.len(), 3);
    assert!(matches!(
        normalized.report[1],
        FeedOutcome::Skipped(FeedSkip::Absent)
    ));
    assert!(!normalized.report[0].is_skipped());
    assert!(!normalized.report[2].is_skipped());
}

#[test_log::test]
fn garbage_feed_is_skipped() {
    let normalized = Normalizer::new(DISPLAY_ZONE).normalize_with_report(
        &[Some(b"<html>not a calendar</html>".to_vec())],
        window(date(2026, 1, 5), date(2026, 1, 5)),
    );

    assert!(normalized.occurrences.is_empty());
    assert!(matches!(
        normalized.report[0],
        FeedOutcome::Skipped(FeedSkip::Unparseable(_))
    ));
}

#[test_log::test]
fn equal_starts_keep_feed_order() {
    let nine = [
        "DTSTART;TZID=America/Chicago:20260105T090000",
        "DTEND;TZID=America/Chicago:20260105T100000",
    ];
    let first = feed(&[vevent("1@a", "From A", &nine)]);
    // same instant written in UTC
    let second = feed(&[vevent(
        "1@b",
        "From B",
        &["DTSTART:20260105T150000Z", "DTEND:20260105T160000Z"],
    )]);

    let occurrences = Normalizer::new(DISPLAY_ZONE)
        .normalize(&[first, second], window(date(2026, 1, 5), date(2026, 1, 5)));

    assert_eq!(titles(&occurrences), vec!["From A", "From B"]);
}

#[test_log::test]
fn overridden_instance_replaces_the_series_instance() {
    let master = vevent(
        "standup@example.com",
        "Standup",
        &[
            "DTSTART;TZID=America/Chicago:20260105T090000",
            "DTEND;TZID=America/Chicago:20260105T093000",
            "RRULE:FREQ=DAILY;COUNT=5",
        ],
    );
    let moved = vevent(
        "standup@example.com",
        "Standup (moved)",
        &[
            "RECURRENCE-ID;TZID=America/Chicago:20260107T090000",
            "DTSTART;TZID=America/Chicago:20260107T110000",
            "DTEND;TZID=America/Chicago:20260107T113000",
        ],
    );

    let occurrences = Normalizer::new(DISPLAY_ZONE)
        .normalize(&[feed(&[master, moved])], window(date(2026, 1, 7), date(2026, 1, 7)));

    assert_eq!(titles(&occurrences), vec!["Standup (moved)"]);
}

#[test_log::test]
fn all_day_entries_sort_before_timed_ones() {
    let events = feed(&[
        vevent(
            "t@x",
            "Breakfast",
            &[
                "DTSTART;TZID=America/Chicago:20260105T070000",
                "DTEND;TZID=America/Chicago:20260105T073000",
            ],
        ),
        vevent("d@x", "Holiday", &["DTSTART;VALUE=DATE:20260105"]),
    ]);

    let occurrences =
        Normalizer::new(DISPLAY_ZONE).normalize(&[events], window(date(2026, 1, 5), date(2026, 1, 5)));

    assert_eq!(titles(&occurrences), vec!["Holiday", "Breakfast"]);
}
