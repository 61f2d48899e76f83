//! Page layout for one day: header, all-day row, hour grid, event boxes and
//! the optional to-do section.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner; a
//! box's `y` is its bottom edge. Layout is pure and never fails.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta, Timelike};
use daysheet_core::types::HourRange;

use super::occurrence::Occurrence;
use super::text::{string_width, wrap};

const HEADER_FONT_SIZE: f32 = 12.0;
const LABEL_FONT_SIZE: f32 = 9.0;
pub const BOX_FONT_SIZE: f32 = 8.0;
/// Horizontal inset of box text from the box's left edge.
pub const BOX_TEXT_INSET: f32 = 5.0;
const BOX_PADDING: f32 = 3.0;
const BOX_LINE_HEIGHT: f32 = 9.0;
/// Approximate advance of one bold 8 pt character.
const BOX_CHAR_WIDTH: f32 = 4.0;
const ALL_DAY_MAX_LINES: usize = 2;
const TODO_ROWS: usize = 4;
pub const CHECKBOX_SIZE: f32 = 10.0;

/// Fixed page geometry, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub hour_height: f32,
}

impl Default for PageGeometry {
    /// The e-ink tablet page: 954 x 1696 px at 264 PPI.
    fn default() -> Self {
        Self {
            width: 954.0 * 72.0 / 264.0,
            height: 1696.0 * 72.0 / 264.0,
            margin: 18.0,
            hour_height: 26.0,
        }
    }
}

impl PageGeometry {
    #[must_use]
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    #[must_use]
    pub fn right_edge(&self) -> f32 {
        self.width - self.margin
    }

    /// Left edge of the primary event column.
    #[must_use]
    pub fn event_x(&self) -> f32 {
        self.margin + 40.0
    }

    #[must_use]
    pub fn event_width(&self) -> f32 {
        (self.content_width() - 56.0) * 0.5
    }

    /// Left edge of the notes column, which absorbs colliding events.
    #[must_use]
    pub fn notes_x(&self) -> f32 {
        self.event_x() + self.event_width() + 10.0
    }

    #[must_use]
    pub fn notes_width(&self) -> f32 {
        self.content_width() - (self.notes_x() - self.margin)
    }

    /// Top of the first grid row, under the header.
    #[must_use]
    pub fn grid_top(&self) -> f32 {
        self.height - self.margin - 20.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: Font,
    pub size: f32,
}

/// Line styles used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    HeaderRule,
    HourLine,
    HalfHourLine,
    TodoLine,
}

impl Stroke {
    #[must_use]
    pub const fn width(self) -> f32 {
        match self {
            Self::HeaderRule | Self::HourLine => 0.5,
            Self::HalfHourLine => 0.25,
            Self::TodoLine => 0.3,
        }
    }

    /// Gray level, 0 is black.
    #[must_use]
    pub const fn gray(self) -> f32 {
        match self {
            Self::HeaderRule | Self::HalfHourLine => 0.827,
            Self::HourLine => 0.502,
            Self::TodoLine => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleLine {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: Stroke,
}

impl RuleLine {
    fn horizontal(x1: f32, x2: f32, y: f32, stroke: Stroke) -> Self {
        Self {
            x1,
            y1: y,
            x2,
            y2: y,
            stroke,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    AllDay,
    Timed,
}

/// An event box with its fitted text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text_lines: Vec<String>,
    pub line_height: f32,
    pub kind: BoxKind,
}

impl PlacedBox {
    /// Text origins `(x, baseline, line)`: a single line is centred
    /// vertically, several lines are spread evenly around the centre.
    #[must_use]
    pub fn text_origins(&self) -> Vec<(f32, f32, &str)> {
        let x = self.x + BOX_TEXT_INSET;
        let count = small(self.text_lines.len());
        let first = if self.text_lines.len() == 1 {
            self.y + self.height / 2.0 - 3.0
        } else {
            self.y + (self.height - count * self.line_height) / 2.0 + (count - 1.0) * self.line_height
        };

        self.text_lines
            .iter()
            .enumerate()
            .map(|(index, line)| (x, first - small(index) * self.line_height, line.as_str()))
            .collect()
    }
}

/// Bottom-left corner of one to-do checkbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkbox {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Everything drawn on one day's page.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayout {
    pub date: NaiveDate,
    pub geometry: PageGeometry,
    pub header: TextRun,
    /// "All Day" and hour labels.
    pub labels: Vec<TextRun>,
    pub rules: Vec<RuleLine>,
    pub all_day: Vec<PlacedBox>,
    pub boxes: Vec<PlacedBox>,
    pub checkboxes: Vec<Checkbox>,
    /// Hours that received a grid row, ascending.
    pub hours: Vec<u32>,
    pub grid_bottom: f32,
}

impl DayLayout {
    #[must_use]
    pub fn has_all_day_row(&self) -> bool {
        !self.all_day.is_empty()
    }
}

/// Lays out day pages on a fixed geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    geometry: PageGeometry,
}

impl LayoutEngine {
    /// ## Summary
    /// Lays out the page for `date`.
    ///
    /// `occurrences` must already be filtered to `date` and sorted; their
    /// order decides which event keeps the primary column when several start
    /// in the same hour. When `show_todo` is set the grid stops early if it
    /// would crowd the to-do section.
    #[must_use]
    pub fn layout(
        &self,
        date: NaiveDate,
        occurrences: &[&Occurrence],
        hours: HourRange,
        show_todo: bool,
    ) -> DayLayout {
        let g = &self.geometry;
        let mut page = DayLayout {
            date,
            geometry: *g,
            header: self.header(date),
            labels: Vec::new(),
            rules: vec![RuleLine::horizontal(
                g.margin,
                g.right_edge(),
                g.height - g.margin - HEADER_FONT_SIZE,
                Stroke::HeaderRule,
            )],
            all_day: Vec::new(),
            boxes: Vec::new(),
            checkboxes: Vec::new(),
            hours: Vec::new(),
            grid_bottom: g.grid_top(),
        };

        let mut y = g.grid_top();
        let all_day: Vec<&Occurrence> = occurrences
            .iter()
            .copied()
            .filter(|occurrence| occurrence.is_all_day())
            .collect();
        if !all_day.is_empty() {
            page.labels.push(label(g.margin, y - 12.0, "All Day"));
            page.all_day = self.all_day_boxes(&all_day, y - g.hour_height);
            y -= g.hour_height;
            page.rules
                .push(RuleLine::horizontal(g.margin, g.right_edge(), y, Stroke::HourLine));
        }

        let grid_top = y;
        for hour in hours.start()..hours.end() {
            page.labels.push(label(g.margin, y - 12.0, &hour_label(hour)));
            page.rules.push(RuleLine::horizontal(
                g.event_x(),
                g.right_edge(),
                y - g.hour_height / 2.0,
                Stroke::HalfHourLine,
            ));
            y -= g.hour_height;
            page.rules
                .push(RuleLine::horizontal(g.margin, g.right_edge(), y, Stroke::HourLine));
            page.hours.push(hour);

            if show_todo && y < g.margin + 100.0 {
                tracing::trace!(%date, hour, "Grid stopped early to fit the to-do section");
                break;
            }
        }
        page.grid_bottom = y;

        page.boxes = self.timed_boxes(occurrences, &page.hours, hours.start(), grid_top);

        if show_todo {
            self.todo_section(&mut page);
        }

        tracing::trace!(
            %date,
            all_day = page.all_day.len(),
            timed = page.boxes.len(),
            "Laid out day page"
        );
        page
    }

    fn header(&self, date: NaiveDate) -> TextRun {
        let g = &self.geometry;
        let text = date.format("%A, %B %d, %Y").to_string();
        let width = string_width(&text, HEADER_FONT_SIZE, true);
        TextRun {
            x: g.right_edge() - width,
            y: g.height - g.margin,
            text,
            font: Font::Bold,
            size: HEADER_FONT_SIZE,
        }
    }

    /// Primary column for the first event, equal slices of the notes column
    /// for the rest.
    fn column(&self, index: usize, count: usize) -> (f32, f32) {
        let g = &self.geometry;
        if index == 0 {
            return (g.event_x(), g.event_width());
        }
        let width = g.notes_width() / small(count - 1);
        (g.notes_x() + small(index - 1) * width, width)
    }

    fn all_day_boxes(&self, events: &[&Occurrence], row_bottom: f32) -> Vec<PlacedBox> {
        let height = self.geometry.hour_height - 2.0 * BOX_PADDING;
        events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let (x, width) = self.column(index, events.len());
                PlacedBox {
                    x,
                    y: row_bottom + BOX_PADDING,
                    width,
                    height,
                    text_lines: wrap(&event.title, chars_per_line(width), ALL_DAY_MAX_LINES),
                    line_height: BOX_LINE_HEIGHT,
                    kind: BoxKind::AllDay,
                }
            })
            .collect()
    }

    fn timed_boxes(
        &self,
        occurrences: &[&Occurrence],
        drawn: &[u32],
        first_hour: u32,
        grid_top: f32,
    ) -> Vec<PlacedBox> {
        let g = &self.geometry;

        let mut buckets: BTreeMap<u32, Vec<&Occurrence>> = BTreeMap::new();
        for occurrence in occurrences.iter().copied() {
            let Some(start) = occurrence.start.as_datetime() else {
                continue;
            };
            if drawn.contains(&start.hour()) {
                buckets.entry(start.hour()).or_default().push(occurrence);
            } else {
                tracing::trace!(title = %occurrence.title, hour = start.hour(), "Event outside grid, not placed");
            }
        }

        let mut boxes = Vec::new();
        for (hour, bucket) in buckets {
            for (index, occurrence) in bucket.iter().enumerate() {
                let Some(start) = occurrence.start.as_datetime() else {
                    continue;
                };
                let offset = small_u32(hour - first_hour) + small_u32(start.minute()) / 60.0;
                let top = grid_top - offset * g.hour_height - 1.0;

                let minutes = display_minutes(occurrence.timed_duration());
                let height = (small_i64(minutes) / 60.0 * g.hour_height - 1.0).max(8.0);
                let (x, width) = self.column(index, bucket.len());

                let available = height - 2.0 * BOX_PADDING;
                let mut line_height = BOX_LINE_HEIGHT;
                let mut max_lines = whole(available / BOX_LINE_HEIGHT).max(1);
                if minutes >= 60 && max_lines < 2 {
                    max_lines = 2;
                    line_height = available / 2.0;
                }

                boxes.push(PlacedBox {
                    x,
                    y: top - height,
                    width,
                    height,
                    text_lines: wrap(&occurrence.title, chars_per_line(width), max_lines),
                    line_height,
                    kind: BoxKind::Timed,
                });
            }
        }
        boxes
    }

    fn todo_section(&self, page: &mut DayLayout) {
        let g = &self.geometry;
        let mut y = page.grid_bottom - 14.0;
        let row_height = (y - g.margin + 22.0) / small(TODO_ROWS);

        for _ in 0..TODO_ROWS {
            let bottom = y - CHECKBOX_SIZE;
            page.checkboxes.push(Checkbox {
                x: g.margin,
                y: bottom,
                size: CHECKBOX_SIZE,
            });
            page.rules.push(RuleLine::horizontal(
                g.margin + CHECKBOX_SIZE + 6.0,
                g.right_edge(),
                bottom,
                Stroke::TodoLine,
            ));
            y -= row_height;
        }
    }
}

/// ## Summary
/// Minutes a timed event occupies on the grid.
///
/// Unknown lengths count as an hour. Lengths are rounded up to the next
/// quarter hour, with a quarter hour minimum.
#[must_use]
pub fn display_minutes(duration: Option<TimeDelta>) -> i64 {
    let Some(duration) = duration else {
        return 60;
    };
    let quarters = (duration.num_seconds() + 899).div_euclid(900);
    (quarters * 15).max(15)
}

/// "6 AM", "12 PM" and so on.
#[must_use]
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_owned(),
        1..=11 => format!("{hour} AM"),
        12 => "12 PM".to_owned(),
        _ => format!("{} PM", hour - 12),
    }
}

fn label(x: f32, y: f32, text: &str) -> TextRun {
    TextRun {
        x,
        y,
        text: text.to_owned(),
        font: Font::Bold,
        size: LABEL_FONT_SIZE,
    }
}

fn chars_per_line(box_width: f32) -> usize {
    whole((box_width - 2.0 * BOX_TEXT_INSET) / BOX_CHAR_WIDTH)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to zero and floored")]
fn whole(value: f32) -> usize {
    value.max(0.0).floor() as usize
}

#[expect(clippy::cast_precision_loss, reason = "line and event counts are small")]
fn small(value: usize) -> f32 {
    value as f32
}

#[expect(clippy::cast_precision_loss, reason = "hours and minutes are small")]
fn small_u32(value: u32) -> f32 {
    value as f32
}

#[expect(clippy::cast_precision_loss, reason = "grid minutes are small")]
fn small_i64(value: i64) -> f32 {
    value as f32
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
