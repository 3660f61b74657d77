//! Exam PDF parser using lopdf.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use crate::detect::{sniff_pdf_file, sniff_pdf_version};
use crate::error::Result;
use crate::model::{Document, Metadata, Page};

use super::backend::{decode_text_simple, LopdfBackend, PdfBackend};
use super::layout::{build_page, LayoutAnalyzer, TextSpan};
use super::options::{ErrorMode, ParseOptions};

/// Exam PDF parser.
///
/// Holds the loaded PDF so that the same handle can later feed the
/// annotated-regions writer and a rasterizer.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        sniff_pdf_file(path)?;
        let backend = LopdfBackend::load_file(path)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        sniff_pdf_version(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions) -> Self {
        if backend.is_encrypted() {
            log::warn!("Document is encrypted; text extraction may be incomplete");
        }
        Self { backend, options }
    }

    /// The loaded PDF.
    pub fn backend(&self) -> &LopdfBackend {
        &self.backend
    }

    /// Parse every page into a [`Document`].
    ///
    /// Content streams are interpreted in page order; grouping spans into
    /// lines and blocks runs on the rayon pool when `parallel` is set.
    pub fn parse(&self) -> Result<Document> {
        let analyzer = LayoutAnalyzer::new(&self.backend);
        let pages = self.backend.pages();

        let mut raw: Vec<(usize, [f32; 4], Vec<TextSpan>)> = Vec::with_capacity(pages.len());
        for (index, (page_num, page_id)) in pages.iter().enumerate() {
            let page_box = self.backend.page_box(*page_id)?;
            let spans = match analyzer.extract_page_spans(*page_id) {
                Ok(spans) => spans,
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            raw.push((index, page_box, spans));
        }

        let built: Vec<Page> = if self.options.parallel {
            raw.into_par_iter()
                .map(|(index, page_box, spans)| build_page(index, page_box, spans))
                .collect()
        } else {
            raw.into_iter()
                .map(|(index, page_box, spans)| build_page(index, page_box, spans))
                .collect()
        };

        let mut document = Document::new();
        document.metadata = self.extract_metadata();
        for page in built {
            document.add_page(page);
        }
        log::debug!("Parsed {} pages", document.page_count());
        Ok(document)
    }

    /// Extract document metadata from the Info dictionary.
    fn extract_metadata(&self) -> Metadata {
        let doc = self.backend.raw_doc();
        let mut metadata = Metadata::with_version(self.backend.version());

        if let Ok(info_ref) = doc.trailer.get(b"Info").and_then(|o| o.as_reference()) {
            if let Ok(info) = doc.get_dictionary(info_ref) {
                metadata.title = get_string_from_dict(info, b"Title");
                metadata.author = get_string_from_dict(info, b"Author");
                metadata.creator = get_string_from_dict(info, b"Creator");
                metadata.producer = get_string_from_dict(info, b"Producer");
                metadata.created =
                    get_string_from_dict(info, b"CreationDate").and_then(|s| parse_pdf_date(&s));
            }
        }

        metadata.encrypted = self.backend.is_encrypted();
        metadata
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSS...), ignoring the zone suffix.
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);
    let field = |range: std::ops::Range<usize>, default: u32| -> u32 {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    let year: i32 = s.get(0..4)?.parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
