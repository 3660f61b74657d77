//! # unprova
//!
//! Question segmentation for entrance-exam PDF booklets.
//!
//! This library finds where each numbered question starts, builds the page
//! regions each question occupies, and exports them as cropped figures, text
//! files and an annotated copy of the booklet.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unprova::{find_positions, parse_file};
//!
//! fn main() -> unprova::Result<()> {
//!     let doc = parse_file("prova.pdf")?;
//!     for position in find_positions(&doc, 60)? {
//!         println!("Questão {} on page {}", position.number, position.page_index);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Marker recognition**: "Questão 7", "QUESTÃO 07" and split keyword/number lines
//! - **Multi-page regions**: one clip per page, trimmed below objective options
//! - **Outputs**: PNG figures, inside/outside texts, outlined regions PDF, JSON report
//! - **Two-column layouts**: gutter detection keeps columns from merging
//! - **Parallel processing**: Uses Rayon to build page layouts

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod transform;

// Re-export commonly used types
pub use detect::{sniff_pdf_file, sniff_pdf_version};
pub use error::{Error, Result};
pub use model::{
    Document, Interval, Metadata, Page, QuestionClip, QuestionPosition, QuestionRects, Rect,
    TextBlock, TextLine,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::{JsonFormat, Rasterizer};
#[cfg(feature = "pdfium")]
pub use render::{bind_pdfium, PdfiumRasterizer};
pub use transform::{
    run_transform, ExportOptions, OutputLayout, TransformConfig, TransformInput, TransformResult,
};

use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse a PDF file into pages of positioned text.
///
/// # Example
///
/// ```no_run
/// use unprova::parse_file;
///
/// let doc = parse_file("prova.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Find question starts in a parsed document.
///
/// # Example
///
/// ```no_run
/// use unprova::{find_positions, parse_file, transform::missing_questions};
///
/// let doc = parse_file("prova.pdf")?;
/// let positions = find_positions(&doc, 60)?;
/// println!("Missing: {:?}", missing_questions(&positions, 60));
/// # Ok::<(), unprova::Error>(())
/// ```
pub fn find_positions(doc: &Document, max_questions: u32) -> Result<Vec<QuestionPosition>> {
    let patterns = transform::QuestionPatterns::new()?;
    Ok(transform::find_question_positions(
        doc,
        &patterns,
        max_questions,
    ))
}

/// Builder for running the whole pipeline on a PDF file.
///
/// # Example
///
/// ```no_run
/// use unprova::Unprova;
///
/// let result = Unprova::new()
///     .with_output_dir("./saida")
///     .with_dpi(200)
///     .without_non_question_images()
///     .run("prova.pdf")?;
/// println!("{} files written", result.files_written);
/// # Ok::<(), unprova::Error>(())
/// ```
pub struct Unprova {
    parse_options: ParseOptions,
    config: TransformConfig,
    exports: ExportOptions,
    layout: OutputLayout,
}

impl Unprova {
    /// Create a builder with default configuration and every output enabled.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            config: TransformConfig::default(),
            exports: ExportOptions::all(),
            layout: OutputLayout::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Replace the transform configuration.
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the highest accepted question number.
    pub fn with_max_questions(mut self, max: u32) -> Self {
        self.config = self.config.with_max_questions(max);
        self
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.config = self.config.with_dpi(dpi);
        self
    }

    /// Select outputs.
    pub fn with_exports(mut self, exports: ExportOptions) -> Self {
        self.exports = exports;
        self
    }

    /// Skip question figures.
    pub fn without_question_images(mut self) -> Self {
        self.exports.question_images = false;
        self
    }

    /// Skip non-question figures.
    pub fn without_non_question_images(mut self) -> Self {
        self.exports.non_question_images = false;
        self
    }

    /// Skip text files.
    pub fn without_texts(mut self) -> Self {
        self.exports.texts = false;
        self
    }

    /// Skip the annotated regions PDF.
    pub fn without_regions_pdf(mut self) -> Self {
        self.exports.regions_pdf = false;
        self
    }

    /// Root every output under `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layout.base_dir = Some(dir.into());
        self
    }

    /// Replace the output layout.
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Parse `path` and run the pipeline on it.
    ///
    /// Figures need the `pdfium` feature and a loadable pdfium library; when
    /// either is missing, figure export is skipped with a warning.
    pub fn run<P: AsRef<Path>>(self, path: P) -> Result<TransformResult> {
        let path = path.as_ref();
        let parser = PdfParser::open_with_options(path, self.parse_options.clone())?;
        let document = parser.parse()?;
        let input = TransformInput::new(&document).with_source(parser.backend().raw_doc());

        #[cfg(feature = "pdfium")]
        {
            if self.exports.question_images || self.exports.non_question_images {
                match bind_pdfium() {
                    Ok(pdfium) => match PdfiumRasterizer::new(&pdfium, parser.backend().data()) {
                        Ok(rasterizer) => {
                            return run_transform(
                                input.with_rasterizer(&rasterizer),
                                &self.config,
                                self.exports,
                                &self.layout,
                            );
                        }
                        Err(e) => log::warn!("{}", e),
                    },
                    Err(e) => log::warn!("{}", e),
                }
            }
        }

        run_transform(input, &self.config, self.exports, &self.layout)
    }
}

impl Default for Unprova {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let builder = Unprova::new()
            .without_question_images()
            .without_texts()
            .with_max_questions(30)
            .with_output_dir("/tmp/x");
        assert!(!builder.exports.question_images);
        assert!(builder.exports.non_question_images);
        assert!(!builder.exports.texts);
        assert_eq!(builder.config.max_questions, 30);
        assert_eq!(builder.layout.base(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_find_positions_on_empty_document() {
        assert!(find_positions(&Document::new(), 60).unwrap().is_empty());
    }

    #[test]
    fn test_parse_bytes_rejects_garbage() {
        assert!(parse_bytes(b"not a pdf").is_err());
    }
}
