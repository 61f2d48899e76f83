//! Writes day layouts as a PDF document with `lopdf`.
//!
//! Only the two standard Helvetica faces are used, so no fonts are embedded.
//! Text is encoded as WinAnsi; characters outside it are drawn as `?`.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{ServiceError, ServiceResult};
use crate::planner::layout::{
    BOX_FONT_SIZE, DayLayout, Font, PlacedBox, RuleLine, TextRun,
};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
/// #4A4A4A
const BOX_FILL: f32 = 74.0 / 255.0;
const BOX_RADIUS: f32 = 2.0;
const CHECKBOX_STROKE: f32 = 0.5;
/// Control point offset for approximating a quarter circle with a cubic.
const KAPPA: f32 = 0.552_284_8;

/// ## Summary
/// Renders one PDF page per layout, in order.
///
/// ## Errors
/// Returns `ServiceError::InvariantViolation` for an empty page list and
/// `ServiceError::Render` if encoding or serializing the document fails.
#[tracing::instrument(skip_all, fields(pages = pages.len()))]
pub fn render_document(pages: &[DayLayout]) -> ServiceResult<Vec<u8>> {
    if pages.is_empty() {
        return Err(ServiceError::InvariantViolation("document has no pages"));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = write_page(&mut doc, pages_id, page)?;
        kids.push(page_id.into());
        tracing::trace!(date = %page.date, "Page written");
    }

    let geometry = pages[0].geometry;
    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                geometry.width.into(),
                geometry.height.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Day Planner"),
        "Producer" => Object::string_literal("daysheet"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|err| ServiceError::Render(err.to_string()))?;

    tracing::debug!(bytes = buffer.len(), "PDF document rendered");
    Ok(buffer)
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn write_page(doc: &mut Document, parent: ObjectId, page: &DayLayout) -> ServiceResult<ObjectId> {
    let mut ops = PageOps::default();

    ops.gray_fill(0.0);
    ops.text(&page.header);
    for label in &page.labels {
        ops.text(label);
    }

    for rule in &page.rules {
        ops.rule(rule);
    }

    for placed in page.all_day.iter().chain(&page.boxes) {
        ops.event_box(placed);
    }

    ops.line_width(CHECKBOX_STROKE);
    ops.gray_stroke(0.0);
    for checkbox in &page.checkboxes {
        ops.push("re", vec![
            checkbox.x.into(),
            checkbox.y.into(),
            checkbox.size.into(),
            checkbox.size.into(),
        ]);
        ops.push("S", vec![]);
    }

    let content = Content {
        operations: ops.operations,
    }
    .encode()
    .map_err(|err| ServiceError::Render(err.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Accumulates the content stream of one page.
#[derive(Default)]
struct PageOps {
    operations: Vec<Operation>,
}

impl PageOps {
    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn line_width(&mut self, width: f32) {
        self.push("w", vec![width.into()]);
    }

    fn gray_stroke(&mut self, level: f32) {
        self.push("G", vec![level.into()]);
    }

    fn gray_fill(&mut self, level: f32) {
        self.push("g", vec![level.into()]);
    }

    fn show_text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        let name = match font {
            Font::Regular => REGULAR_FONT,
            Font::Bold => BOLD_FONT,
        };
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(name.as_bytes().to_vec()), size.into()]);
        self.push("Td", vec![x.into(), y.into()]);
        self.push("Tj", vec![Object::string_literal(win_ansi(text))]);
        self.push("ET", vec![]);
    }

    fn text(&mut self, run: &TextRun) {
        self.show_text(run.font, run.size, run.x, run.y, &run.text);
    }

    fn rule(&mut self, rule: &RuleLine) {
        self.line_width(rule.stroke.width());
        self.gray_stroke(rule.stroke.gray());
        self.push("m", vec![rule.x1.into(), rule.y1.into()]);
        self.push("l", vec![rule.x2.into(), rule.y2.into()]);
        self.push("S", vec![]);
    }

    fn event_box(&mut self, placed: &PlacedBox) {
        self.push("rg", vec![BOX_FILL.into(), BOX_FILL.into(), BOX_FILL.into()]);
        self.push("RG", vec![BOX_FILL.into(), BOX_FILL.into(), BOX_FILL.into()]);
        self.rounded_rect(placed.x, placed.y, placed.width, placed.height, BOX_RADIUS);
        self.push("B", vec![]);

        self.gray_fill(1.0);
        for (x, y, line) in placed.text_origins() {
            self.show_text(Font::Bold, BOX_FONT_SIZE, x, y, line);
        }
        self.gray_fill(0.0);
    }

    fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let k = r * KAPPA;
        let (right, top) = (x + width, y + height);

        self.push("m", vec![(x + r).into(), y.into()]);
        self.push("l", vec![(right - r).into(), y.into()]);
        self.curve((right - r + k, y), (right, y + r - k), (right, y + r));
        self.push("l", vec![right.into(), (top - r).into()]);
        self.curve((right, top - r + k), (right - r + k, top), (right - r, top));
        self.push("l", vec![(x + r).into(), top.into()]);
        self.curve((x + r - k, top), (x, top - r + k), (x, top - r));
        self.push("l", vec![x.into(), (y + r).into()]);
        self.curve((x, y + r - k), (x + r - k, y), (x + r, y));
        self.push("h", vec![]);
    }

    fn curve(&mut self, c1: (f32, f32), c2: (f32, f32), end: (f32, f32)) {
        self.push("c", vec![
            c1.0.into(),
            c1.1.into(),
            c2.0.into(),
            c2.1.into(),
            end.0.into(),
            end.1.into(),
        ]);
    }
}

/// Encodes `text` for a WinAnsi font.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => u8::try_from(ch).unwrap_or(b'?'),
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}
