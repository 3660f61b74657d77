//! PDF parsing module.

mod backend;
mod layout;
mod options;
mod pdf_parser;

pub(crate) use backend::page_box;
pub use backend::{decode_text_simple, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use layout::{build_page, detect_columns, Column, LayoutAnalyzer, TextSpan};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::PdfParser;
