//! Question text extraction.

use std::collections::BTreeMap;

use crate::model::{Document, Page, QuestionRects, Rect};

use super::patterns::QuestionPatterns;

/// Texts keyed by question number.
pub type QuestionTexts = BTreeMap<u32, String>;

/// Whether a text block belongs to some question's own content.
pub fn block_contains_question(text: &str, patterns: &QuestionPatterns) -> bool {
    patterns.mentions_question(text)
}

/// Reading-order text inside `rect`, trimmed.
pub fn get_text_in_rect(page: &Page, rect: &Rect) -> String {
    page.text_in(rect)
}

/// Text inside each question's clips, and the surrounding context.
///
/// The inside text joins every clip's text with a blank line. The outside
/// text collects, from each page a question touches, the blocks that neither
/// intersect that clip nor mention a numbered question, each labelled with
/// its 1-based page number.
pub fn extract_question_texts(
    doc: &Document,
    rects: &QuestionRects,
    patterns: &QuestionPatterns,
) -> (QuestionTexts, QuestionTexts) {
    let mut inside = QuestionTexts::new();
    let mut outside = QuestionTexts::new();

    for (&number, clips) in rects {
        let mut inside_parts = Vec::new();
        let mut outside_parts = Vec::new();

        for clip in clips {
            let Some(page) = doc.page(clip.page_index) else {
                continue;
            };
            let text = get_text_in_rect(page, &clip.rect);
            if !text.is_empty() {
                inside_parts.push(text);
            }

            for block in &page.blocks {
                let block_text = block.text();
                let block_text = block_text.trim();
                if block_text.is_empty() || block_contains_question(block_text, patterns) {
                    continue;
                }
                if !clip.rect.intersects(&block.bbox) {
                    outside_parts.push(format!("[Page {}]\n{}", clip.page_index + 1, block_text));
                }
            }
        }

        inside.insert(number, inside_parts.join("\n\n"));
        outside.insert(number, outside_parts.join("\n---\n"));
    }

    (inside, outside)
}
