//! The planner over HTTP, from form post to PDF bytes.

use daysheet_test::component::constants::GENERATE_ROUTE_PREFIX;
use lopdf::Document;
use salvo::http::StatusCode;
use salvo::http::header::CONTENT_DISPOSITION;
use salvo::test::{ResponseExt, TestClient};

use crate::helpers::{calendar, form_body, page_strings, service, vevent};

const BASE: &str = "http://127.0.0.1:5800";
const WORK: &str = "https://feeds.example/work.ics";
const HOME: &str = "https://feeds.example/home.ics";

fn feeds() -> Vec<(&'static str, String)> {
    vec![
        (
            WORK,
            calendar(&[vevent(
                "standup@example.com",
                "Standup",
                &[
                    "DTSTART;TZID=America/Chicago:20260105T090000",
                    "DTEND;TZID=America/Chicago:20260105T093000",
                    "RRULE:FREQ=DAILY",
                ],
            )]),
        ),
        (
            HOME,
            calendar(&[vevent(
                "dentist@example.com",
                "Dentist",
                &[
                    "DTSTART;TZID=Central Standard Time:20260106T150000",
                    "DTEND;TZID=Central Standard Time:20260106T160000",
                ],
            )]),
        ),
    ]
}

#[test_log::test(tokio::test)]
async fn posted_feeds_become_a_planner() {
    let urls = format!("{WORK}, https://feeds.example/gone.ics, {HOME}");
    let body = form_body(&[
        ("ical_urls", urls.as_str()),
        ("start_date", "2026-01-05"),
        ("end_date", "2026-01-06"),
        ("start_hour", "8"),
        ("end_hour", "18"),
        ("show_todos", "on"),
    ]);

    let mut resp = TestClient::post(format!("{BASE}{GENERATE_ROUTE_PREFIX}"))
        .raw_form(body)
        .send(&service(&feeds()))
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::OK));
    assert_eq!(
        resp.headers().get(CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"1-5-to-1-6.pdf\""
    );

    let pdf = resp.take_bytes(None).await.unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    let monday = page_strings(&doc, 1);
    assert!(monday.iter().any(|s| s == "Monday, January 05, 2026"));
    assert!(monday.iter().any(|s| s == "8 AM"));
    assert!(monday.iter().any(|s| s == "Standup"));
    assert!(!monday.iter().any(|s| s == "Dentist"));

    let tuesday = page_strings(&doc, 2);
    assert!(tuesday.iter().any(|s| s == "Standup"));
    assert!(tuesday.iter().any(|s| s == "Dentist"));
}

#[test_log::test(tokio::test)]
async fn reversed_dates_are_rejected() {
    let body = form_body(&[
        ("ical_urls", WORK),
        ("start_date", "2026-01-09"),
        ("end_date", "2026-01-05"),
    ]);

    let mut resp = TestClient::post(format!("{BASE}{GENERATE_ROUTE_PREFIX}"))
        .raw_form(body)
        .send(&service(&feeds()))
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    let json: serde_json::Value = resp.take_json().await.unwrap();
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[test_log::test(tokio::test)]
async fn long_hour_range_is_rejected() {
    let body = form_body(&[
        ("ical_urls", WORK),
        ("start_hour", "6"),
        ("end_hour", "19"),
    ]);

    let mut resp = TestClient::post(format!("{BASE}{GENERATE_ROUTE_PREFIX}"))
        .raw_form(body)
        .send(&service(&feeds()))
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    let json: serde_json::Value = resp.take_json().await.unwrap();
    assert_eq!(json["error"], "Time range cannot exceed 12 hours");
}
