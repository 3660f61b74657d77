//! Vertical interval arithmetic over question regions.

use crate::model::{Interval, QuestionRects, Rect};

/// Vertical spans of the question clips that land on `page_index`,
/// sorted by their top edge. Only the first clip of a question on a page
/// is taken.
pub fn question_intervals_on_page(rects: &QuestionRects, page_index: usize) -> Vec<Interval> {
    let mut out: Vec<Interval> = rects
        .values()
        .filter_map(|clips| clips.iter().find(|c| c.page_index == page_index))
        .map(|c| c.rect.interval())
        .collect();
    out.sort_by(|a, b| a.0.total_cmp(&b.0));
    out
}

/// Merge intervals sorted by start into a minimal disjoint cover.
///
/// An interval that starts at or before the current end (overlap or touch)
/// extends it; anything else opens a new interval.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut out: Vec<Interval> = Vec::with_capacity(intervals.len());
    for &(a, b) in intervals {
        match out.last_mut() {
            Some(last) if a <= last.1 => last.1 = last.1.max(b),
            _ => out.push((a, b)),
        }
    }
    out
}

/// Parts of the page height not covered by any question, top to bottom.
///
/// Gaps no taller than `tolerance` are dropped.
pub fn non_question_intervals_on_page(
    rects: &QuestionRects,
    page_index: usize,
    page_rect: &Rect,
    tolerance: f32,
) -> Vec<Interval> {
    let merged = merge_intervals(&question_intervals_on_page(rects, page_index));
    complement_intervals(&merged, page_rect.y0, page_rect.y1, tolerance)
}

/// Complement of merged intervals within `[y0, y1]`.
pub fn complement_intervals(merged: &[Interval], y0: f32, y1: f32, tolerance: f32) -> Vec<Interval> {
    let mut out = Vec::new();
    let mut current = y0;
    for &(a, b) in merged {
        if current < a - tolerance {
            out.push((current, a));
        }
        current = current.max(b);
    }
    if current < y1 - tolerance {
        out.push((current, y1));
    }
    out
}
