//! Manual page layout — places a `LogicalResumeModel` onto A4 pages.
//!
//! # Coordinate system
//! Points, origin at the top-left corner of the page, `y` growing downward.
//! The PDF writer flips `y` when it emits content streams.
//!
//! # Cursor
//! A single vertical cursor walks down the page. Every line is placed through
//! `Cursor::ensure`, which starts a new page when the line would cross the
//! bottom margin. Horizontal extents are bounded by the font-metric wrapper,
//! so no text op crosses the right margin.

use serde::Serialize;

use crate::models::{Entry, LogicalResumeModel, Section};
use crate::render::font_metrics::{get_metrics, FontStyle};

pub const MM_TO_PT: f32 = 72.0 / 25.4;

const NAME_SIZE: f32 = 16.0;
const NAME_LINE: f32 = 24.0;
const CONTACT_SIZE: f32 = 10.0;
const CONTACT_LINE: f32 = 14.0;
const HEADER_GAP: f32 = 4.0;

const HEADING_SIZE: f32 = 14.0;
const HEADING_LINE: f32 = 20.0;
const HEADING_RULE_GAP: f32 = 1.0;
const RULE_WIDTH: f32 = 0.5;
const RULE_ENTRIES_GAP: f32 = 4.0;
const SECTION_GAP: f32 = 5.0;

const ROW_SIZE: f32 = 11.0;
const ROW_LINE: f32 = 14.0;
const DETAIL_SIZE: f32 = 10.0;
const DETAIL_LINE: f32 = 13.0;
const ENTRY_GAP: f32 = 2.0;

const BODY_SIZE: f32 = 10.0;
const BODY_LINE: f32 = 13.0;

const BULLET: &str = "•";
/// Minimum horizontal distance between a left-column label and right-column text.
const COLUMN_GAP: f32 = 8.0;
/// Space kept between a lead glyph or label and the indented text.
const LEAD_GAP: f32 = 2.0;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with 15 mm margins on every side.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin: 15.0 * MM_TO_PT,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn right_edge(&self) -> f32 {
        self.width - self.margin
    }

    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }

    fn bullet_column(&self) -> f32 {
        5.0 * MM_TO_PT
    }

    fn label_column(&self) -> f32 {
        30.0 * MM_TO_PT
    }
}

/// A single drawing instruction. `y` is the text baseline for `Text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: FontStyle,
        size: f32,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor state machine
// ────────────────────────────────────────────────────────────────────────────

struct Cursor {
    geometry: PageGeometry,
    y: f32,
    pages: Vec<Page>,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.margin,
            pages: vec![Page::default()],
        }
    }

    /// Starts a new page if a block of height `h` does not fit below the
    /// cursor. A block taller than a whole page is placed anyway.
    fn ensure(&mut self, h: f32) {
        let at_top = self.y <= self.geometry.margin;
        if self.y + h > self.geometry.bottom_limit() && !at_top {
            self.pages.push(Page::default());
            self.y = self.geometry.margin;
        }
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Baseline that vertically centres text of `size` in a line of height `h`.
    fn baseline(&self, h: f32, size: f32) -> f32 {
        self.y + h * 0.5 + size * 0.35
    }

    fn text(&mut self, x: f32, baseline: f32, font: FontStyle, size: f32, text: String) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text { x, y: baseline, font, size, text });
    }

    fn centered_line(&mut self, text: &str, font: FontStyle, size: f32, h: f32) {
        let metrics = get_metrics(font);
        let width = self.geometry.content_width();
        let text = metrics.truncate_to_width(text, size, width);
        let w = metrics.width_pt(&text, size);

        self.ensure(h);
        let x = self.geometry.margin + (width - w) / 2.0;
        let baseline = self.baseline(h, size);
        self.text(x, baseline, font, size, text);
        self.advance(h);
    }

    /// One row with a left-aligned label and a right-aligned value. The right
    /// side keeps its natural width (capped at half the line); the left side
    /// is truncated so the two never touch.
    fn two_column_row(
        &mut self,
        left: &str,
        right: &str,
        font: FontStyle,
        size: f32,
        h: f32,
    ) {
        let metrics = get_metrics(font);
        let width = self.geometry.content_width();

        let right = metrics.truncate_to_width(right, size, width / 2.0);
        let right_w = metrics.width_pt(&right, size);
        let left_max = if right.is_empty() {
            width
        } else {
            width - right_w - COLUMN_GAP
        };
        let left = metrics.truncate_to_width(left, size, left_max);

        self.ensure(h);
        let baseline = self.baseline(h, size);
        self.text(self.geometry.margin, baseline, font, size, left);
        self.text(self.geometry.right_edge() - right_w, baseline, font, size, right);
        self.advance(h);
    }

    /// Wrapped text starting at `indent` from the left margin. `lead` is drawn
    /// at the margin on the first line only.
    fn wrapped_block(
        &mut self,
        lead: Option<(&str, FontStyle)>,
        text: &str,
        indent: f32,
        font: FontStyle,
        size: f32,
        h: f32,
    ) {
        let metrics = get_metrics(font);
        let lines = metrics.wrap(text, size, self.geometry.content_width() - indent);
        let x = self.geometry.margin + indent;

        for (i, line) in lines.into_iter().enumerate() {
            self.ensure(h);
            let baseline = self.baseline(h, size);
            if i == 0 {
                if let Some((lead_text, lead_font)) = lead {
                    let lead_text = get_metrics(lead_font).truncate_to_width(
                        lead_text,
                        size,
                        (indent - LEAD_GAP).max(0.0),
                    );
                    self.text(self.geometry.margin, baseline, lead_font, size, lead_text);
                }
            }
            self.text(x, baseline, font, size, line);
            self.advance(h);
        }
    }

    fn rule(&mut self) {
        let y = self.y;
        self.push(DrawOp::Rule {
            x1: self.geometry.margin,
            x2: self.geometry.right_edge(),
            y,
            width: RULE_WIDTH,
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the model on A4 pages.
pub fn layout_resume(model: &LogicalResumeModel) -> PaginatedDocument {
    let mut cursor = Cursor::new(PageGeometry::A4);

    cursor.centered_line(&model.full_name, FontStyle::Bold, NAME_SIZE, NAME_LINE);
    if !model.contact_line.is_empty() {
        cursor.centered_line(&model.contact_line, FontStyle::Regular, CONTACT_SIZE, CONTACT_LINE);
    }
    cursor.advance(HEADER_GAP);

    for section in &model.sections {
        layout_section(&mut cursor, section);
    }

    PaginatedDocument {
        geometry: cursor.geometry,
        pages: cursor.pages,
    }
}

fn layout_section(cursor: &mut Cursor, section: &Section) {
    // Keep the heading together with its rule and the first body line.
    cursor.ensure(HEADING_LINE + HEADING_RULE_GAP + RULE_ENTRIES_GAP + BODY_LINE);

    let baseline = cursor.baseline(HEADING_LINE, HEADING_SIZE);
    let title = get_metrics(FontStyle::Bold).truncate_to_width(
        &section.title,
        HEADING_SIZE,
        cursor.geometry.content_width(),
    );
    cursor.text(cursor.geometry.margin, baseline, FontStyle::Bold, HEADING_SIZE, title);
    cursor.advance(HEADING_LINE + HEADING_RULE_GAP);
    cursor.rule();
    cursor.advance(RULE_ENTRIES_GAP);

    for entry in &section.entries {
        layout_entry(cursor, entry);
    }
    cursor.advance(SECTION_GAP);
}

fn layout_entry(cursor: &mut Cursor, entry: &Entry) {
    match entry {
        Entry::Subheading { org, location, title, dates } => {
            // Keep both rows of a subheading on the same page.
            cursor.ensure(ROW_LINE + DETAIL_LINE);
            cursor.two_column_row(org, location, FontStyle::Bold, ROW_SIZE, ROW_LINE);
            cursor.two_column_row(title, dates, FontStyle::Oblique, DETAIL_SIZE, DETAIL_LINE);
            cursor.advance(ENTRY_GAP);
        }
        Entry::ProjectHeading { summary, dates } => {
            cursor.two_column_row(summary, dates, FontStyle::Bold, ROW_SIZE, ROW_LINE);
            cursor.advance(ENTRY_GAP);
        }
        Entry::BulletItem { text } => {
            let indent = cursor.geometry.bullet_column();
            cursor.wrapped_block(
                Some((BULLET, FontStyle::Regular)),
                text,
                indent,
                FontStyle::Regular,
                BODY_SIZE,
                BODY_LINE,
            );
        }
        Entry::SkillCategory { label, items } => {
            let indent = cursor.geometry.label_column();
            let label = format!("{label}:");
            cursor.wrapped_block(
                Some((label.as_str(), FontStyle::Bold)),
                items,
                indent,
                FontStyle::Regular,
                BODY_SIZE,
                BODY_LINE,
            );
        }
        Entry::Paragraph { text } => {
            cursor.wrapped_block(None, text, 0.0, FontStyle::Regular, BODY_SIZE, BODY_LINE);
        }
    }
}
