//! Question start detection and numbering diagnostics.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Document, Page, QuestionPosition, Rect};

use super::patterns::{LineMatch, QuestionPatterns};

/// Candidate (number, marker box) pairs on one page, in line order.
///
/// A "start" line yields its own number. A keyword-alone line yields the
/// number on the line right after it, anchored at the keyword's box.
pub fn find_question_candidates(page: &Page, patterns: &QuestionPatterns) -> Vec<(u32, Rect)> {
    let mut out = Vec::new();
    for (i, line) in page.lines.iter().enumerate() {
        match patterns.classify(&line.text) {
            LineMatch::Start(n) => out.push((n, line.bbox)),
            LineMatch::KeywordAlone => {
                if let Some(n) = page
                    .lines
                    .get(i + 1)
                    .and_then(|next| patterns.number_alone(&next.text))
                {
                    out.push((n, line.bbox));
                }
            }
            LineMatch::NumberAlone(_) | LineMatch::None => {}
        }
    }
    out
}

/// Find where each question starts.
///
/// The first occurrence of a number wins (earliest page, then topmost on the
/// page) and numbers outside `1..=max_questions` are dropped. The result is sorted by page and then by
/// the top of the marker, not by question number.
pub fn find_question_positions(
    doc: &Document,
    patterns: &QuestionPatterns,
    max_questions: u32,
) -> Vec<QuestionPosition> {
    let mut seen = BTreeSet::new();
    let mut positions = Vec::new();

    for page in &doc.pages {
        // Within a page the topmost occurrence wins, whatever column it sits in.
        let mut candidates = find_question_candidates(page, patterns);
        candidates.sort_by(|a, b| a.1.y0.total_cmp(&b.1.y0).then(a.1.x0.total_cmp(&b.1.x0)));

        for (number, rect) in candidates {
            if !(1..=max_questions).contains(&number) {
                log::debug!(
                    "Ignoring question {} on page {}: outside 1..={}",
                    number,
                    page.index,
                    max_questions
                );
                continue;
            }
            if !seen.insert(number) {
                log::debug!("Ignoring repeated question {} on page {}", number, page.index);
                continue;
            }
            log::debug!(
                "Question {} starts on page {} at y={:.1}",
                number,
                page.index,
                rect.y0
            );
            positions.push(QuestionPosition::new(number, page.index, rect));
        }
    }

    positions.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.start_rect.y0.total_cmp(&b.start_rect.y0))
    });
    positions
}

/// Numbers in `1..=max_questions` that were never found.
pub fn missing_questions(positions: &[QuestionPosition], max_questions: u32) -> Vec<u32> {
    let found: BTreeSet<u32> = positions.iter().map(|p| p.number).collect();
    (1..=max_questions).filter(|n| !found.contains(n)).collect()
}

/// Two consecutive positions whose numbers are not successive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberingGap {
    /// Number of the earlier position
    pub after: u32,
    /// Number of the position that followed it
    pub next: u32,
    /// Numbers strictly between the two (empty when numbering went backwards)
    pub missing: Vec<u32>,
}

/// Report every place where position order and numbering disagree.
pub fn numbering_gaps(positions: &[QuestionPosition]) -> Vec<NumberingGap> {
    positions
        .windows(2)
        .filter(|w| w[1].number != w[0].number + 1)
        .map(|w| NumberingGap {
            after: w[0].number,
            next: w[1].number,
            missing: (w[0].number + 1..w[1].number).collect(),
        })
        .collect()
}
