//! Page rasterization and region cropping.

use image::{imageops, DynamicImage, RgbImage, RgbaImage};

use crate::error::Result;
use crate::model::Rect;

/// Renders whole pages to pixels.
///
/// Implementations render page `page_index` (0-based) at `dpi`, so one PDF
/// point maps to `dpi / 72` pixels.
pub trait Rasterizer {
    /// Render a page.
    fn render_page(&self, page_index: usize, dpi: u32) -> Result<RgbaImage>;
}

/// Pixels per PDF point at `dpi`.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / 72.0
}

/// Cut `clip` out of a rendered page and drop the alpha channel.
///
/// `page_rect` is the page's own rectangle in the same space as `clip`. The
/// pixel box is clamped to the image; an empty box yields a 1x1 image.
pub fn crop_to_clip(page_image: &RgbaImage, clip: &Rect, page_rect: &Rect, dpi: u32) -> RgbImage {
    let (width, height) = page_image.dimensions();
    if width == 0 || height == 0 {
        return RgbImage::new(1, 1);
    }

    let scale = scale_for_dpi(dpi);
    let to_px = |v: f32, origin: f32, max: u32| -> u32 {
        (((v - origin) * scale).round().max(0.0) as u32).min(max)
    };
    let x0 = to_px(clip.x0, page_rect.x0, width - 1);
    let y0 = to_px(clip.y0, page_rect.y0, height - 1);
    let x1 = to_px(clip.x1, page_rect.x0, width);
    let y1 = to_px(clip.y1, page_rect.y0, height);

    let w = x1.saturating_sub(x0).max(1);
    let h = y1.saturating_sub(y0).max(1);
    let cropped = imageops::crop_imm(page_image, x0, y0, w, h).to_image();
    DynamicImage::ImageRgba8(cropped).to_rgb8()
}

/// Keeps the most recently rendered page so consecutive clips on the same
/// page are rendered once.
pub struct PageCache<'r> {
    rasterizer: &'r dyn Rasterizer,
    dpi: u32,
    current: Option<(usize, RgbaImage)>,
}

impl<'r> PageCache<'r> {
    /// Create an empty cache.
    pub fn new(rasterizer: &'r dyn Rasterizer, dpi: u32) -> Self {
        Self {
            rasterizer,
            dpi,
            current: None,
        }
    }

    /// Crop `clip` from page `page_index`, rendering it if needed.
    pub fn crop(&mut self, page_index: usize, clip: &Rect, page_rect: &Rect) -> Result<RgbImage> {
        let cached = matches!(&self.current, Some((index, _)) if *index == page_index);
        if !cached {
            let image = self.rasterizer.render_page(page_index, self.dpi)?;
            self.current = Some((page_index, image));
        }
        match &self.current {
            Some((_, image)) => Ok(crop_to_clip(image, clip, page_rect, self.dpi)),
            None => Ok(RgbImage::new(1, 1)),
        }
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium::{bind_pdfium, PdfiumRasterizer};

#[cfg(feature = "pdfium")]
mod pdfium {
    use std::path::Path;

    use image::RgbaImage;
    use pdfium_render::prelude::{PdfDocument, PdfRenderConfig, Pdfium, PdfiumError};

    use super::{scale_for_dpi, Rasterizer};
    use crate::error::{Error, Result};

    fn render_err(e: PdfiumError) -> Error {
        Error::Render(format!("pdfium: {:?}", e))
    }

    /// Bind the pdfium shared library.
    ///
    /// The library is looked up in the working directory first and then on
    /// the system library path.
    pub fn bind_pdfium() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::Render(format!("failed to load pdfium library: {:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }

    /// Rasterizer over one PDF loaded into pdfium.
    ///
    /// The document is parsed once and every page render reuses it.
    pub struct PdfiumRasterizer<'a> {
        document: PdfDocument<'a>,
    }

    impl<'a> PdfiumRasterizer<'a> {
        /// Load the PDF held in `data`.
        pub fn new(pdfium: &'a Pdfium, data: &'a [u8]) -> Result<Self> {
            let document = pdfium
                .load_pdf_from_byte_slice(data, None)
                .map_err(render_err)?;
            Ok(Self { document })
        }

        /// Load the PDF at `path`.
        pub fn from_file<P: AsRef<Path>>(pdfium: &'a Pdfium, path: P) -> Result<Self> {
            let document = pdfium
                .load_pdf_from_file(path.as_ref(), None)
                .map_err(render_err)?;
            Ok(Self { document })
        }

        /// Number of pages in the loaded document.
        pub fn page_count(&self) -> usize {
            self.document.pages().len() as usize
        }
    }

    impl Rasterizer for PdfiumRasterizer<'_> {
        fn render_page(&self, page_index: usize, dpi: u32) -> Result<RgbaImage> {
            let index = u16::try_from(page_index)
                .map_err(|_| Error::PageOutOfRange(page_index as u32, self.page_count() as u32))?;
            let page = self.document.pages().get(index).map_err(render_err)?;

            let config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));
            let bitmap = page.render_with_config(&config).map_err(render_err)?;
            let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
            RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
                Error::Render(format!(
                    "page {} bitmap does not match {}x{}",
                    page_index, width, height
                ))
            })
        }
    }
}
