//! Question positions and regions.

use std::collections::BTreeMap;

use super::Rect;
use serde::{Deserialize, Serialize};

/// Where a question starts: its number, page and the box of the marker line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionPosition {
    /// Question number (1-based, bounded by the configured maximum)
    pub number: u32,

    /// Page index (0-based)
    pub page_index: usize,

    /// Bounding box of the line that opened the question
    pub start_rect: Rect,
}

impl QuestionPosition {
    /// Create a new position.
    pub fn new(number: u32, page_index: usize, start_rect: Rect) -> Self {
        Self {
            number,
            page_index,
            start_rect,
        }
    }
}

/// One page-slice of a question region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionClip {
    /// Page index (0-based)
    pub page_index: usize,

    /// Clip rectangle on that page
    pub rect: Rect,
}

impl QuestionClip {
    /// Create a new clip.
    pub fn new(page_index: usize, rect: Rect) -> Self {
        Self { page_index, rect }
    }
}

/// Question number to its clips, one per spanned page in ascending page order.
pub type QuestionRects = BTreeMap<u32, Vec<QuestionClip>>;
