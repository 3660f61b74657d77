//! Question regions.
//!
//! A question runs from its own marker to the next question's marker. Regions
//! that cross pages are split into one clip per page. The first and last clips
//! of each region are cut short below the multiple-choice options they hold.

use crate::model::{Document, Page, QuestionClip, QuestionPosition, QuestionRects, Rect};

use super::config::TransformConfig;

/// Lowest option marker inside `clip`, plus `margin`.
///
/// Markers are lines beginning with "A (", "B (", ... for each configured
/// letter; the blank-answer form "A ( )" shares the same prefix.
pub fn objective_block_bottom(
    page: &Page,
    clip: &Rect,
    letters: &[char],
    margin: f32,
) -> Option<f32> {
    letters
        .iter()
        .flat_map(|letter| page.search_line_start(&format!("{letter} ("), clip))
        .map(|r| r.y1)
        .reduce(f32::max)
        .map(|y| y + margin)
}

/// Shrink `clip` so it ends just below the objective block.
///
/// The clip is returned unchanged when there are no markers or the trimmed
/// bottom would not be above the current one.
pub fn clip_to_objective_block_end(page: &Page, clip: Rect, config: &TransformConfig) -> Rect {
    match objective_block_bottom(
        page,
        &clip,
        &config.objective_option_letters,
        config.objective_block_end_margin,
    ) {
        Some(bottom) if bottom < clip.y1 => {
            log::debug!(
                "Trimming clip on page {} from y1={:.1} to {:.1}",
                page.index,
                clip.y1,
                bottom
            );
            clip.with_y1(bottom)
        }
        _ => clip,
    }
}

/// Build the clip list of every question.
///
/// `positions` must be in document order as returned by
/// [`find_question_positions`](super::find_question_positions). The last
/// question has no successor and ends at the bottom of its own start page.
pub fn build_question_rectangles(
    doc: &Document,
    positions: &[QuestionPosition],
    config: &TransformConfig,
) -> QuestionRects {
    let mut questions = QuestionRects::new();
    let Some(first) = doc.pages.first() else {
        return questions;
    };
    let x0 = first.rect.x0 + config.margin_left;
    let x1 = first.rect.x1;
    let page_rect = |index: usize| doc.page(index).map(|p| p.rect).unwrap_or(first.rect);

    for (i, position) in positions.iter().enumerate() {
        let start_page = position.page_index;
        let start_y = position.start_rect.y0 - config.margin_top;
        let (end_page, end_y) = match positions.get(i + 1) {
            Some(next) => (next.page_index, next.start_rect.y0 - config.margin_bottom),
            None => (start_page, page_rect(start_page).y1),
        };

        let clips = if end_page <= start_page {
            let clip = Rect::new(x0, start_y, x1, end_y);
            vec![QuestionClip::new(start_page, trim(doc, start_page, clip, config))]
        } else {
            let mut clips = Vec::with_capacity(end_page - start_page + 1);
            let head = Rect::new(x0, start_y, x1, page_rect(start_page).y1);
            clips.push(QuestionClip::new(start_page, trim(doc, start_page, head, config)));
            for p in start_page + 1..end_page {
                let pr = page_rect(p);
                clips.push(QuestionClip::new(p, Rect::new(x0, pr.y0, x1, pr.y1)));
            }
            let last = Rect::new(x0, page_rect(end_page).y0, x1, end_y);
            clips.push(QuestionClip::new(end_page, trim(doc, end_page, last, config)));
            clips
        };
        questions.insert(position.number, clips);
    }

    questions
}

fn trim(doc: &Document, page_index: usize, clip: Rect, config: &TransformConfig) -> Rect {
    match doc.page(page_index) {
        Some(page) => clip_to_objective_block_end(page, clip, config),
        None => clip,
    }
}
