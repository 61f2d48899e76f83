//! Request validation and the fetch, normalize, lay out, render pipeline.

use chrono::{Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use daysheet_core::config::PlannerConfig;
use daysheet_core::constants::DEFAULT_WINDOW_DAYS;
use daysheet_core::types::{DateWindow, HourRange};
use serde::Deserialize;

use crate::error::{ServiceResult, ValidationError};
use crate::feed::{FeedFetcher, fetch_all};
use crate::planner::layout::LayoutEngine;
use crate::planner::normalize::Normalizer;
use crate::planner::occurrence::Occurrence;
use crate::render::render_document;

/// Raw form fields, exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannerForm {
    #[serde(default)]
    pub ical_urls: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_hour: Option<String>,
    pub end_hour: Option<String>,
    /// Checkbox value; absent when unchecked.
    pub show_todos: Option<String>,
}

/// A validated planner request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerRequest {
    pub sources: Vec<String>,
    pub window: DateWindow,
    pub hours: HourRange,
    pub show_todos: bool,
}

impl PlannerRequest {
    /// ## Summary
    /// Validates a submitted form.
    ///
    /// Blank fields take their defaults: hours from `defaults`, the start
    /// date from the Monday after `today`, the end date six days after the
    /// start.
    ///
    /// ## Errors
    /// Returns the first `ValidationError` found, checking sources, then
    /// hours, then dates.
    pub fn from_form(
        form: &PlannerForm,
        today: NaiveDate,
        defaults: &PlannerConfig,
    ) -> Result<Self, ValidationError> {
        let sources: Vec<String> = form
            .ical_urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect();
        Self::with_sources(sources, form, today, defaults)
    }

    /// ## Summary
    /// Validates a form whose sources are already split, ignoring
    /// `form.ical_urls`.
    ///
    /// ## Errors
    /// Same as `from_form`.
    pub fn with_sources(
        sources: Vec<String>,
        form: &PlannerForm,
        today: NaiveDate,
        defaults: &PlannerConfig,
    ) -> Result<Self, ValidationError> {
        if sources.is_empty() {
            return Err(ValidationError::NoSources);
        }

        let start_hour = parse_hour(form.start_hour.as_deref(), defaults.start_hour)?;
        let end_hour = parse_hour(form.end_hour.as_deref(), defaults.end_hour)?;
        let hours = HourRange::new(start_hour, end_hour)?;

        let start = match non_blank(form.start_date.as_deref()) {
            Some(raw) => parse_date(raw)?,
            None => next_monday(today),
        };
        let end = match non_blank(form.end_date.as_deref()) {
            Some(raw) => parse_date(raw)?,
            None => start
                .checked_add_days(Days::new(u64::from(DEFAULT_WINDOW_DAYS - 1)))
                .ok_or_else(|| ValidationError::InvalidDate(start.to_string()))?,
        };
        let window = DateWindow::new(start, end)?;

        let show_todos = form.show_todos.as_deref().is_some_and(|value| {
            let value = value.trim();
            value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true")
        });

        Ok(Self {
            sources,
            window,
            hours,
            show_todos,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_hour(value: Option<&str>, default: u32) -> Result<u32, ValidationError> {
    match non_blank(value) {
        Some(raw) => raw
            .parse()
            .map_err(|_err| ValidationError::InvalidHour(raw.to_owned())),
        None => Ok(default),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_err| ValidationError::InvalidDate(raw.to_owned()))
}

/// First Monday strictly after `today`.
#[must_use]
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let ahead = 7 - today.weekday().num_days_from_monday();
    today + Days::new(u64::from(ahead))
}

/// ## Summary
/// Download name for a planner: `M-D.pdf` for one day, `M-D-to-M-D.pdf`
/// otherwise.
#[must_use]
pub fn planner_filename(window: DateWindow) -> String {
    let (start, end) = (window.start(), window.end());
    if start == end {
        format!("{}-{}.pdf", start.month(), start.day())
    } else {
        format!(
            "{}-{}-to-{}-{}.pdf",
            start.month(),
            start.day(),
            end.month(),
            end.day()
        )
    }
}

/// A finished planner document.
#[derive(Debug, Clone)]
pub struct RenderedPlanner {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub occurrence_count: usize,
}

/// ## Summary
/// Builds the planner from already fetched feed blobs, one page per date in
/// the window.
///
/// ## Errors
/// Returns `ServiceError::Render` if the PDF cannot be written.
#[tracing::instrument(skip_all, fields(days = request.window.day_count(), feeds = blobs.len()))]
pub fn generate_document(
    request: &PlannerRequest,
    blobs: &[Option<Vec<u8>>],
    tz: Tz,
) -> ServiceResult<RenderedPlanner> {
    let occurrences = Normalizer::new(tz).normalize(blobs, request.window);
    let engine = LayoutEngine::default();

    let pages: Vec<_> = request
        .window
        .days()
        .map(|date| {
            let day: Vec<&Occurrence> = occurrences.iter().filter(|o| o.date == date).collect();
            engine.layout(date, &day, request.hours, request.show_todos)
        })
        .collect();
    let pdf = render_document(&pages)?;

    tracing::info!(
        pages = pages.len(),
        occurrences = occurrences.len(),
        "Planner generated"
    );
    Ok(RenderedPlanner {
        filename: planner_filename(request.window),
        pdf,
        occurrence_count: occurrences.len(),
    })
}

/// ## Summary
/// Fetches every source, then builds the planner.
///
/// ## Errors
/// Returns `ServiceError::Render` if the PDF cannot be written. Unreachable
/// feeds are not errors.
pub async fn generate_planner(
    fetcher: &dyn FeedFetcher,
    request: &PlannerRequest,
    tz: Tz,
) -> ServiceResult<RenderedPlanner> {
    let blobs = fetch_all(fetcher, &request.sources).await;
    generate_document(request, &blobs, tz)
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
