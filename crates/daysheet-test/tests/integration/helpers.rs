//! Test helpers for planner scenarios.
//!
//! Provides utilities for:
//! - Building iCalendar feeds from event snippets
//! - Running the parse, expand and normalize steps on them
//! - Building the HTTP service with a stub fetcher
//! - Inspecting generated PDFs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use daysheet_test::app::config::{ConfigHandler, LoggingConfig, PlannerConfig, ServerConfig, Settings};
use daysheet_test::app::fetcher_handler::FeedFetcherHandler;
use daysheet_test::component::feed::FeedFetcher;
use daysheet_test::component::planner::expand::{ExpandOutcome, Expander};
use daysheet_test::component::planner::recurrence::RawEventDefinition;
use daysheet_test::component::types::DateWindow;
use daysheet_test::rfc::rfc::ical::expand::timezone::TimeZoneResolver;
use daysheet_test::rfc::rfc::ical::parse::parse;
use lopdf::content::Content;
use lopdf::{Document, Object};
use salvo::{Router, Service};

pub const DISPLAY_ZONE: Tz = chrono_tz::America::Chicago;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
    DateWindow::new(start, end).unwrap()
}

/// Builds a VEVENT block from `name:value` lines.
pub fn vevent(uid: &str, summary: &str, lines: &[&str]) -> String {
    let mut event = format!("BEGIN:VEVENT\r\nUID:{uid}\r\nSUMMARY:{summary}\r\n");
    for line in lines {
        event.push_str(line);
        event.push_str("\r\n");
    }
    event.push_str("END:VEVENT\r\n");
    event
}

/// Wraps VEVENT blocks in a VCALENDAR.
pub fn calendar(events: &[String]) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//daysheet//tests//EN\r\n{}END:VCALENDAR\r\n",
        events.concat()
    )
}

pub fn feed(events: &[String]) -> Option<Vec<u8>> {
    Some(calendar(events).into_bytes())
}

/// Parses a single-event calendar and extracts its definition.
pub fn definition(event: &str) -> RawEventDefinition {
    let ical = parse(&calendar(&[event.to_owned()])).unwrap();
    let component = ical.events().next().unwrap();
    RawEventDefinition::from_component(component, &mut TimeZoneResolver::new())
}

pub fn expand(event: &str, window: DateWindow) -> ExpandOutcome {
    Expander::new(DISPLAY_ZONE).expand(&definition(event), window)
}

pub struct StubFetcher {
    pub feeds: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.feeds.get(url).cloned()
    }
}

pub fn settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 5800,
        },
        logging: LoggingConfig {
            level: "debug".to_owned(),
        },
        planner: PlannerConfig::default(),
    }
}

/// The full router with the given feeds served by a stub fetcher.
pub fn service(feeds: &[(&str, String)]) -> Service {
    let fetcher = StubFetcher {
        feeds: feeds
            .iter()
            .map(|(url, body)| ((*url).to_owned(), body.clone().into_bytes()))
            .collect(),
    };
    let router = Router::new()
        .hoop(ConfigHandler {
            settings: settings(),
        })
        .hoop(FeedFetcherHandler {
            fetcher: Arc::new(fetcher),
        })
        .push(daysheet_test::app::app::api::routes());
    Service::new(router)
}

/// Percent-encodes the characters feed URLs need inside a form body.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            let value = value
                .replace('%', "%25")
                .replace(':', "%3A")
                .replace('/', "%2F")
                .replace(',', "%2C")
                .replace(' ', "+");
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Strings drawn with `Tj` on a 1-based page.
pub fn page_strings(doc: &Document, page_number: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page_number];
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}
