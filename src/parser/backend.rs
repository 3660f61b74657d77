//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the layout analysis logic.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, page boxes, content stream
/// decoding, and text decoding without exposing any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId), page numbers 1-based.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the page media box `[llx, lly, urx, ury]` in PDF user space,
    /// inherited from ancestor page tree nodes when the page lacks one.
    fn page_media_box(&self, page: PageId) -> Result<[f32; 4]>;

    /// Return the visible page area `[llx, lly, urx, ury]`: the CropBox
    /// clipped to the media box, or the media box itself.
    fn page_box(&self, page: PageId) -> Result<[f32; 4]>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Document as LopdfDocument, Object};

/// US Letter, used when no media box can be resolved.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
///
/// The original bytes are kept so that rasterizers working from a separate
/// library can load the very same file.
pub struct LopdfBackend {
    doc: LopdfDocument,
    data: Vec<u8>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_owned(data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::load_owned(data.to_vec())
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_owned(data)
    }

    fn load_owned(data: Vec<u8>) -> Result<Self> {
        let doc = LopdfDocument::load_mem(&data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self { doc, data })
    }

    /// Direct access to the underlying `lopdf::Document`.
    ///
    /// Escape hatch for writers (annotated region PDF) and metadata.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// The original file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_media_box(&self, page: PageId) -> Result<[f32; 4]> {
        media_box(&self.doc, page)
    }

    fn page_box(&self, page: PageId) -> Result<[f32; 4]> {
        page_box(&self.doc, page)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            // A page without content is legal (blank draft pages).
            Err(_) => return Ok(Vec::new()),
        };

        let contents = match contents {
            Object::Reference(r) => self
                .doc
                .get_object(*r)
                .map_err(|e| Error::PdfParse(e.to_string()))?,
            other => other,
        };

        match contents {
            // Unfiltered streams fail decompression; their content is already plain.
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            let data = s
                                .decompressed_content()
                                .unwrap_or_else(|_| s.content.clone());
                            content.extend_from_slice(&data);
                            content.push(b'\n');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Resolve a page media box, walking up `/Parent` links when needed.
pub(crate) fn media_box(doc: &LopdfDocument, page: PageId) -> Result<[f32; 4]> {
    match inherited_box(doc, page, b"MediaBox")? {
        Some(b) => Ok(b),
        None => {
            log::debug!("No MediaBox for page {:?}, assuming US Letter", page);
            Ok(DEFAULT_MEDIA_BOX)
        }
    }
}

/// The visible page area: the CropBox clipped to the media box, or the media
/// box when the page has no usable CropBox. Viewers and rasterizers show
/// exactly this area.
pub(crate) fn page_box(doc: &LopdfDocument, page: PageId) -> Result<[f32; 4]> {
    let media = media_box(doc, page)?;
    let Some(crop) = inherited_box(doc, page, b"CropBox")? else {
        return Ok(media);
    };
    let clipped = [
        crop[0].max(media[0]),
        crop[1].max(media[1]),
        crop[2].min(media[2]),
        crop[3].min(media[3]),
    ];
    if clipped[2] - clipped[0] <= 0.0 || clipped[3] - clipped[1] <= 0.0 {
        log::debug!("CropBox of page {:?} lies outside its MediaBox; ignoring it", page);
        return Ok(media);
    }
    Ok(clipped)
}

/// Look up a rectangle entry on the page or its ancestors.
fn inherited_box(doc: &LopdfDocument, page: PageId, key: &[u8]) -> Result<Option<[f32; 4]>> {
    let name = String::from_utf8_lossy(key);
    let mut node = page;
    // Page trees are shallow; the bound guards against reference cycles.
    for _ in 0..32 {
        let dict = doc
            .get_dictionary(node)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        if let Ok(obj) = dict.get(key) {
            let obj = match obj {
                Object::Reference(r) => doc
                    .get_object(*r)
                    .map_err(|e| Error::PdfParse(e.to_string()))?,
                other => other,
            };
            let array = obj
                .as_array()
                .map_err(|e| Error::Corrupted(format!("{name} is not an array: {e}")))?;
            if array.len() < 4 {
                return Err(Error::Corrupted(format!("{name} has fewer than 4 entries")));
            }
            let mut v = [0.0f32; 4];
            for (slot, item) in v.iter_mut().zip(array.iter()) {
                *slot = item
                    .as_float()
                    .map_err(|e| Error::Corrupted(format!("{name} entry: {e}")))?;
            }
            // Normalise so that the first corner is lower-left.
            return Ok(Some([
                v[0].min(v[2]),
                v[1].min(v[3]),
                v[0].max(v[2]),
                v[1].max(v[3]),
            ]));
        }

        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => node = parent,
            Err(_) => break,
        }
    }
    Ok(None)
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
