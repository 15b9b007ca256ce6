//! Page layout for the exported will.
//!
//! Coordinates are in CSS pixels at 1× scale. Text is set in an 8×8 bitmap
//! font scaled by an integer factor, so a character of size `n` occupies an
//! `8n × 8n` cell.

use super::WillView;

/// Width of the page.
pub const PAGE_WIDTH: u32 = 768;

/// Padding around the page content.
pub const PAGE_PADDING: u32 = 32;

/// Width and height of one glyph at size 1.
pub const GLYPH_SIZE: u32 = 8;

/// Padding inside the message panel.
const PANEL_PADDING: u32 = 24;

/// Small captions and labels.
pub const SIZE_SMALL: u32 = 1;
/// Field values and the message.
pub const SIZE_BODY: u32 = 2;
/// Section headings.
pub const SIZE_HEADING: u32 = 3;

/// Colours used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Headings and field values.
    Ink,
    /// Message text.
    Body,
    /// Labels and captions.
    Muted,
    /// Horizontal rules.
    Rule,
    /// Message panel background.
    Panel,
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Glyph scale factor.
    pub size: u32,
    /// Text colour.
    pub paint: Paint,
    /// The characters, already wrapped to fit.
    pub text: String,
}

/// A filled rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Fill colour.
    pub paint: Paint,
}

/// A laid-out page: blocks are painted first, then text on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Page width.
    pub width: u32,
    /// Page height.
    pub height: u32,
    /// Background blocks.
    pub blocks: Vec<Block>,
    /// Text runs.
    pub runs: Vec<TextRun>,
}

/// Line height for a glyph size.
#[must_use]
pub fn line_height(size: u32) -> u32 {
    GLYPH_SIZE * size * 3 / 2
}

/// Number of characters of `size` that fit in `width`.
#[must_use]
pub fn columns(width: u32, size: u32) -> usize {
    (width / (GLYPH_SIZE * size)).max(1) as usize
}

/// Wrap `text` to at most `max_columns` characters per line.
///
/// Line breaks in the input are kept and blank lines survive, like
/// `white-space: pre-wrap`. Words longer than a line are split.
#[must_use]
pub fn wrap(text: &str, max_columns: usize) -> Vec<String> {
    let max_columns = max_columns.max(1);
    let mut lines = Vec::new();

    for hard_line in text.split('\n') {
        let hard_line = hard_line.strip_suffix('\r').unwrap_or(hard_line);
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in hard_line.split(' ') {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > max_columns {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }

            for ch in word.chars() {
                if current_len == max_columns {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
        }

        lines.push(current);
    }

    lines
}

/// Accumulates runs and blocks while walking down the page.
struct Cursor {
    y: u32,
    layout: Layout,
}

impl Cursor {
    fn text(&mut self, x: u32, width: u32, size: u32, paint: Paint, text: &str) {
        for line in wrap(text, columns(width, size)) {
            self.layout.runs.push(TextRun {
                x,
                y: self.y,
                size,
                paint,
                text: line,
            });
            self.y += line_height(size);
        }
    }

    fn block(&mut self, x: u32, width: u32, height: u32, paint: Paint) {
        self.layout.blocks.push(Block {
            x,
            y: self.y,
            width,
            height,
            paint,
        });
    }

    fn gap(&mut self, amount: u32) {
        self.y += amount;
    }
}

/// Lay a will out on a page.
#[must_use]
pub fn layout(view: &WillView) -> Layout {
    let left = PAGE_PADDING;
    let inner = PAGE_WIDTH - 2 * PAGE_PADDING;

    let mut cursor = Cursor {
        y: PAGE_PADDING,
        layout: Layout {
            width: PAGE_WIDTH,
            height: 0,
            blocks: Vec::new(),
            runs: Vec::new(),
        },
    };

    cursor.text(left, inner, SIZE_HEADING, Paint::Ink, "Personal Information");
    cursor.gap(8);

    cursor.text(left, inner, SIZE_SMALL, Paint::Muted, "Full Name");
    cursor.gap(4);
    cursor.text(left, inner, SIZE_BODY, Paint::Ink, &view.full_name);
    cursor.gap(12);

    cursor.text(left, inner, SIZE_SMALL, Paint::Muted, "Date of Birth");
    cursor.gap(4);
    cursor.text(left, inner, SIZE_BODY, Paint::Ink, &view.date_of_birth);
    cursor.gap(32);

    cursor.block(left, inner, 1, Paint::Rule);
    cursor.gap(33);

    cursor.text(left, inner, SIZE_HEADING, Paint::Ink, "Final Message");
    cursor.gap(16);

    // The panel height is only known after the message is set, so reserve
    // its slot and fill it in afterwards.
    let panel_top = cursor.y;
    let panel_index = cursor.layout.blocks.len();
    cursor.block(left, inner, 0, Paint::Panel);
    cursor.gap(PANEL_PADDING);
    cursor.text(
        left + PANEL_PADDING,
        inner - 2 * PANEL_PADDING,
        SIZE_BODY,
        Paint::Body,
        &view.message,
    );
    cursor.gap(PANEL_PADDING);
    cursor.layout.blocks[panel_index].height = cursor.y - panel_top;
    cursor.gap(32);

    cursor.text(
        left,
        inner,
        SIZE_SMALL,
        Paint::Muted,
        &format!("Created on: {}", view.created_on),
    );
    cursor.gap(PAGE_PADDING);

    cursor.layout.height = cursor.y;
    cursor.layout
}
