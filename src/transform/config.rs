//! Transform configuration.
//!
//! Every tunable of the segmentation engine lives here and is passed into
//! the pipeline explicitly. Defaults fit the two-column single-booklet layout
//! of the ITA entrance exam.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for question detection, region building and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Highest question number accepted
    pub max_questions: u32,

    /// Space kept above a question's marker line
    pub margin_top: f32,

    /// Space left between a region's end and the next question's marker
    pub margin_bottom: f32,

    /// Offset from the page's left edge where region clips begin
    pub margin_left: f32,

    /// Space kept below the lowest multiple-choice option
    pub objective_block_end_margin: f32,

    /// Letters that open multiple-choice options ("A (", "B (", ...)
    pub objective_option_letters: Vec<char>,

    /// Rasterization resolution
    pub dpi: u32,

    /// Non-question strips shorter than this are not exported
    pub min_non_question_height: f32,

    /// Stripped text length under which a "rascunho" page counts as a draft
    pub draft_page_max_text_len: usize,

    /// Gaps between question intervals must exceed this to be emitted
    pub gap_tolerance: f32,

    /// Outline colour of the annotated PDF, RGB in 0..=1
    pub regions_stroke_color: [f32; 3],

    /// Outline width of the annotated PDF, in points
    pub regions_stroke_width: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_questions: 60,
            margin_top: 8.0,
            margin_bottom: 4.0,
            margin_left: 0.0,
            objective_block_end_margin: 6.0,
            objective_option_letters: vec!['A', 'B', 'C', 'D', 'E'],
            dpi: 150,
            min_non_question_height: 20.0,
            draft_page_max_text_len: 200,
            gap_tolerance: 1.0,
            regions_stroke_color: [1.0, 0.0, 0.0],
            regions_stroke_width: 1.5,
        }
    }
}

impl TransformConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_questions == 0 {
            return Err(Error::Config("max_questions must be at least 1".into()));
        }
        if self.dpi == 0 {
            return Err(Error::Config("dpi must be positive".into()));
        }
        if self.regions_stroke_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(Error::Config(
                "regions_stroke_color components must be in 0..=1".into(),
            ));
        }
        Ok(())
    }

    /// Set the highest accepted question number.
    pub fn with_max_questions(mut self, max: u32) -> Self {
        self.max_questions = max;
        self
    }

    /// Set the top and bottom region margins.
    pub fn with_margins(mut self, top: f32, bottom: f32) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }

    /// Set the left clip offset.
    pub fn with_margin_left(mut self, left: f32) -> Self {
        self.margin_left = left;
        self
    }

    /// Set the margin kept below multiple-choice options.
    pub fn with_objective_block_end_margin(mut self, margin: f32) -> Self {
        self.objective_block_end_margin = margin;
        self
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the minimum height of exported non-question strips.
    pub fn with_min_non_question_height(mut self, height: f32) -> Self {
        self.min_non_question_height = height;
        self
    }
}
