//! Output writers: figures, text files, the annotated PDF and JSON reports.

mod annotate;
mod figures;
mod json;
mod raster;
mod texts;

pub use annotate::{export_question_regions_pdf, overlay_operations, region_overlays, to_pdf_rect};
pub use figures::{
    export_non_question_figures, export_question_figures, non_question_figure_name,
    question_figure_name,
};
pub use json::{to_json, JsonFormat};
pub use raster::{crop_to_clip, scale_for_dpi, PageCache, Rasterizer};
#[cfg(feature = "pdfium")]
pub use raster::{bind_pdfium, PdfiumRasterizer};
pub use texts::save_question_text_files;
