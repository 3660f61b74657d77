//! Page-level types.

use super::Rect;
use serde::{Deserialize, Serialize};

/// A line of text with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Line text as decoded from the content stream
    pub text: String,

    /// Bounding box in page space
    pub bbox: Rect,

    /// Dominant font size in points
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line.
    pub fn new(text: impl Into<String>, bbox: Rect, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_size,
        }
    }

    /// Vertical centre of the line.
    pub fn center_y(&self) -> f32 {
        (self.bbox.y0 + self.bbox.y1) / 2.0
    }

    /// Whether the line belongs to a clip: its vertical centre lies inside
    /// and it overlaps the clip horizontally.
    pub fn falls_in(&self, clip: &Rect) -> bool {
        let cy = self.center_y();
        cy >= clip.y0 && cy <= clip.y1 && self.bbox.x1 > clip.x0 && self.bbox.x0 < clip.x1
    }
}

/// A group of consecutive lines forming a paragraph-like block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines in reading order
    pub lines: Vec<TextLine>,

    /// Union of the line boxes
    pub bbox: Rect,
}

impl TextBlock {
    /// Build a block from lines, computing the covering box.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let bbox = lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { lines, bbox }
    }

    /// Block text, one line per row.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single page of an exam booklet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Page bounds in page space, normally `(0, 0, width, height)`
    pub rect: Rect,

    /// Text lines in reading order, column by column
    pub lines: Vec<TextLine>,

    /// Text blocks built from the same lines
    pub blocks: Vec<TextBlock>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            rect: Rect::new(0.0, 0.0, width, height),
            lines: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Create an empty A4 page (210 x 297 mm).
    pub fn a4(index: usize) -> Self {
        Self::new(index, 595.0, 842.0)
    }

    /// Replace the page lines; every line becomes its own block.
    pub fn with_lines(mut self, lines: Vec<TextLine>) -> Self {
        self.blocks = lines
            .iter()
            .cloned()
            .map(|l| TextBlock::from_lines(vec![l]))
            .collect();
        self.lines = lines;
        self
    }

    /// Replace the page blocks; lines are taken from the blocks in order.
    pub fn with_blocks(mut self, blocks: Vec<TextBlock>) -> Self {
        self.lines = blocks.iter().flat_map(|b| b.lines.iter().cloned()).collect();
        self.blocks = blocks;
        self
    }

    /// Full page text, one line per row.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full page text with surrounding whitespace removed.
    pub fn stripped_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Lines that fall inside `clip`.
    pub fn lines_in<'a>(&'a self, clip: &'a Rect) -> impl Iterator<Item = &'a TextLine> + 'a {
        self.lines.iter().filter(move |l| l.falls_in(clip))
    }

    /// Text inside `clip`, ordered top-to-bottom then left-to-right.
    pub fn text_in(&self, clip: &Rect) -> String {
        let mut lines: Vec<&TextLine> = self.lines_in(clip).collect();
        lines.sort_by(|a, b| {
            a.bbox
                .y0
                .total_cmp(&b.bbox.y0)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });
        lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Boxes of the lines inside `clip` whose text contains `needle`.
    pub fn search(&self, needle: &str, clip: &Rect) -> Vec<Rect> {
        self.lines_in(clip)
            .filter(|l| l.text.contains(needle))
            .map(|l| l.bbox)
            .collect()
    }

    /// Boxes of the lines inside `clip` that begin with `prefix`,
    /// leading whitespace ignored.
    pub fn search_line_start(&self, prefix: &str, clip: &Rect) -> Vec<Rect> {
        self.lines_in(clip)
            .filter(|l| l.text.trim_start().starts_with(prefix))
            .map(|l| l.bbox)
            .collect()
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Page dimensions as (width, height).
    pub fn dimensions(&self) -> (f32, f32) {
        (self.rect.width(), self.rect.height())
    }
}
