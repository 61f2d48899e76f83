//! Whole-document properties: pages, rows and box sizes.

use chrono::TimeDelta;
use daysheet_test::component::generate::{PlannerRequest, generate_document};
use daysheet_test::component::planner::layout::{LayoutEngine, PageGeometry, display_minutes};
use daysheet_test::component::planner::normalize::Normalizer;
use daysheet_test::component::planner::occurrence::Occurrence;
use daysheet_test::component::types::HourRange;
use lopdf::Document;

use crate::helpers::{DISPLAY_ZONE, date, feed, page_strings, vevent, window};

fn request(start: u32, end: u32, show_todos: bool) -> PlannerRequest {
    PlannerRequest {
        sources: vec!["https://feeds.example/a.ics".to_owned()],
        window: window(date(2026, 1, 5), date(2026, 1, 7)),
        hours: HourRange::new(start, end).unwrap(),
        show_todos,
    }
}

#[test_log::test]
fn one_page_per_day_for_every_valid_hour_range() {
    for start in 0..=12 {
        for span in 8..=12 {
            let end = start + span;
            if end > 24 {
                continue;
            }
            for show_todos in [true, false] {
                let rendered = generate_document(&request(start, end, show_todos), &[None], DISPLAY_ZONE)
                    .unwrap();
                let doc = Document::load_mem(&rendered.pdf).unwrap();
                assert_eq!(doc.get_pages().len(), 3, "hours {start}..{end}");
            }
        }
    }
}

#[test_log::test]
fn all_day_row_only_on_the_day_that_has_one() {
    let blobs = [feed(&[
        vevent(
            "holiday@example.com",
            "Holiday",
            &["DTSTART;VALUE=DATE:20260106", "DTEND;VALUE=DATE:20260107"],
        ),
        vevent(
            "standup@example.com",
            "Standup",
            &[
                "DTSTART;TZID=America/Chicago:20260105T090000",
                "DTEND;TZID=America/Chicago:20260105T093000",
                "RRULE:FREQ=DAILY",
            ],
        ),
    ])];

    let rendered = generate_document(&request(6, 17, true), &blobs, DISPLAY_ZONE).unwrap();
    assert_eq!(rendered.filename, "1-5-to-1-7.pdf");
    assert_eq!(rendered.occurrence_count, 4);

    let doc = Document::load_mem(&rendered.pdf).unwrap();
    for page in 1..=3 {
        let strings = page_strings(&doc, page);
        let has_row = strings.iter().any(|s| s == "All Day");
        assert_eq!(has_row, page == 2, "page {page}");
        assert!(strings.iter().any(|s| s == "Standup"), "page {page}");
    }
    assert!(page_strings(&doc, 2).iter().any(|s| s == "Holiday"));
}

#[test_log::test]
fn thirty_seven_minutes_draw_as_forty_five() {
    let blobs = [feed(&[vevent(
        "sync@example.com",
        "Sync",
        &[
            "DTSTART;TZID=America/Chicago:20260105T100000",
            "DTEND;TZID=America/Chicago:20260105T103700",
        ],
    )])];
    let occurrences = Normalizer::new(DISPLAY_ZONE).normalize(&blobs, window(date(2026, 1, 5), date(2026, 1, 5)));
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].timed_duration(), Some(TimeDelta::minutes(37)));
    assert_eq!(display_minutes(occurrences[0].timed_duration()), 45);

    let refs: Vec<&Occurrence> = occurrences.iter().collect();
    let page = LayoutEngine::default().layout(
        date(2026, 1, 5),
        &refs,
        HourRange::new(6, 17).unwrap(),
        false,
    );

    let geometry = PageGeometry::default();
    assert_eq!(page.boxes.len(), 1);
    let expected = 45.0 / 60.0 * geometry.hour_height - 1.0;
    assert!((page.boxes[0].height - expected).abs() < 1e-3);
}

#[test_log::test]
fn events_before_the_grid_are_not_drawn() {
    let blobs = [feed(&[vevent(
        "early@example.com",
        "Early run",
        &[
            "DTSTART;TZID=America/Chicago:20260105T050000",
            "DTEND;TZID=America/Chicago:20260105T060000",
        ],
    )])];
    let req = PlannerRequest {
        window: window(date(2026, 1, 5), date(2026, 1, 5)),
        ..request(6, 17, false)
    };

    let rendered = generate_document(&req, &blobs, DISPLAY_ZONE).unwrap();

    assert_eq!(rendered.occurrence_count, 1);
    let doc = Document::load_mem(&rendered.pdf).unwrap();
    assert!(!page_strings(&doc, 1).iter().any(|s| s == "Early run"));
}
