//! Question segmentation pipeline.
//!
//! Stages run in order: find question starts, build per-page regions, then
//! export figures, texts and the annotated PDF as requested. Every stage
//! takes the configuration explicitly.

mod config;
mod intervals;
mod pages;
mod paths;
mod patterns;
mod positions;
mod rectangles;
mod text;

pub use config::TransformConfig;
pub use intervals::{
    complement_intervals, merge_intervals, non_question_intervals_on_page,
    question_intervals_on_page,
};
pub use pages::{is_draft_page, is_essay_page, page_has_question, strip_suffix, PageKind};
pub use paths::{base_dir_from, default_base_dir, OutputLayout};
pub use patterns::{fold_diacritics, LineMatch, QuestionPatterns};
pub use positions::{
    find_question_candidates, find_question_positions, missing_questions, numbering_gaps,
    NumberingGap,
};
pub use rectangles::{
    build_question_rectangles, clip_to_objective_block_end, objective_block_bottom,
};
pub use text::{block_contains_question, extract_question_texts, get_text_in_rect, QuestionTexts};

use std::path::PathBuf;

use lopdf::Document as LopdfDocument;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Document, QuestionPosition, QuestionRects};
use crate::render::{
    export_non_question_figures, export_question_figures, export_question_regions_pdf,
    save_question_text_files, Rasterizer,
};

/// Which outputs a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Question figures
    pub question_images: bool,
    /// Non-question figures
    pub non_question_images: bool,
    /// Inside/outside text files
    pub texts: bool,
    /// Annotated regions PDF
    pub regions_pdf: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl ExportOptions {
    /// Every output.
    pub fn all() -> Self {
        Self {
            question_images: true,
            non_question_images: true,
            texts: true,
            regions_pdf: true,
        }
    }

    /// Detection only; nothing is written.
    pub fn none() -> Self {
        Self {
            question_images: false,
            non_question_images: false,
            texts: false,
            regions_pdf: false,
        }
    }
}

/// What the pipeline reads from.
#[derive(Clone, Copy)]
pub struct TransformInput<'a> {
    /// Parsed pages
    pub document: &'a Document,
    /// The source PDF, needed for the annotated copy
    pub source: Option<&'a LopdfDocument>,
    /// Page renderer, needed for figures
    pub rasterizer: Option<&'a dyn Rasterizer>,
}

impl<'a> TransformInput<'a> {
    /// Input with pages only.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            source: None,
            rasterizer: None,
        }
    }

    /// Attach the source PDF.
    pub fn with_source(mut self, source: &'a LopdfDocument) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach a rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: &'a dyn Rasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }
}

/// Everything a run found and where it wrote it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformResult {
    /// Question starts in document order
    pub positions: Vec<QuestionPosition>,
    /// Clips of each question
    pub question_rects: QuestionRects,
    /// Numbers in `1..=max_questions` that were not found
    pub missing_questions: Vec<u32>,
    /// Places where numbering skips or goes backwards
    pub numbering_gaps: Vec<NumberingGap>,
    /// Text inside each question's clips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_texts: Option<QuestionTexts>,
    /// Context blocks around each question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_texts: Option<QuestionTexts>,
    /// Where question figures went
    pub questions_figs_dir: Option<PathBuf>,
    /// Where non-question figures went
    pub non_questions_figs_dir: Option<PathBuf>,
    /// Where text files went
    pub texts_dir: Option<PathBuf>,
    /// Where the annotated PDF went
    pub regions_pdf_path: Option<PathBuf>,
    /// Number of files written
    pub files_written: usize,
}

/// Run the whole pipeline.
///
/// Detection never fails; a booklet with no recognizable markers yields an
/// empty result. Filesystem errors abort the run.
pub fn run_transform(
    input: TransformInput<'_>,
    config: &TransformConfig,
    exports: ExportOptions,
    layout: &OutputLayout,
) -> Result<TransformResult> {
    config.validate()?;
    let doc = input.document;
    let patterns = QuestionPatterns::new()?;

    let positions = find_question_positions(doc, &patterns, config.max_questions);
    let question_rects = build_question_rectangles(doc, &positions, config);
    log::info!(
        "Found {} question starts, built regions for {}",
        positions.len(),
        question_rects.len()
    );

    let mut result = TransformResult {
        missing_questions: missing_questions(&positions, config.max_questions),
        numbering_gaps: numbering_gaps(&positions),
        positions,
        question_rects,
        ..TransformResult::default()
    };

    let wants_images = exports.question_images || exports.non_question_images;
    match input.rasterizer {
        Some(rasterizer) => {
            if exports.question_images {
                let dir = layout.questions_figs_dir();
                let written = export_question_figures(
                    doc,
                    &result.question_rects,
                    rasterizer,
                    &dir,
                    config.dpi,
                )?;
                result.files_written += written.len();
                result.questions_figs_dir = Some(dir);
            }
            if exports.non_question_images {
                let dir = layout.non_questions_figs_dir();
                let written = export_non_question_figures(
                    doc,
                    &result.question_rects,
                    rasterizer,
                    &dir,
                    &patterns,
                    config,
                )?;
                result.files_written += written.len();
                result.non_questions_figs_dir = Some(dir);
            }
        }
        None if wants_images => log::warn!("No rasterizer available; skipping figure export"),
        None => {}
    }

    if exports.texts {
        let (inside, outside) = extract_question_texts(doc, &result.question_rects, &patterns);
        let dir = layout.texts_dir();
        result.files_written += save_question_text_files(&inside, &outside, &dir)?.len();
        result.inside_texts = Some(inside);
        result.outside_texts = Some(outside);
        result.texts_dir = Some(dir);
    }

    if exports.regions_pdf {
        match input.source {
            Some(source) => {
                let path = layout.regions_pdf_path();
                export_question_regions_pdf(
                    source,
                    &result.question_rects,
                    &path,
                    config.regions_stroke_color,
                    config.regions_stroke_width,
                )?;
                result.files_written += 1;
                result.regions_pdf_path = Some(path);
            }
            None => log::warn!("No source PDF available; skipping regions PDF"),
        }
    }

    Ok(result)
}
