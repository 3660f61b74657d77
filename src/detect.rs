//! Header sniffing for downloaded booklets.
//!
//! Exam archives sometimes serve an HTML error page under a `.pdf` name;
//! checking the `%PDF-x.y` header up front gives a clear error instead of
//! a confusing parser failure deep inside lopdf.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Return the header version (e.g. `"1.7"`) of a PDF byte buffer.
///
/// Leading whitespace or a UTF-8 BOM before the magic is tolerated, as
/// some generators emit one.
pub fn sniff_pdf_version(data: &[u8]) -> Result<String> {
    let start = data
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0xEF | 0xBB | 0xBF))
        .unwrap_or(data.len());
    let data = &data[start..];

    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version: String = data[PDF_MAGIC.len()..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|b| *b as char)
        .collect();

    match version.split_once('.') {
        Some((major, minor)) if !major.is_empty() && !minor.is_empty() => Ok(version),
        _ => Err(Error::UnknownFormat),
    }
}

/// Read the first bytes of a file and return its PDF header version.
pub fn sniff_pdf_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(32);
    File::open(path)?.take(32).read_to_end(&mut header)?;
    sniff_pdf_version(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_plain_header() {
        assert_eq!(sniff_pdf_version(b"%PDF-1.7\n%\xe2\xe3").unwrap(), "1.7");
        assert_eq!(sniff_pdf_version(b"%PDF-2.0\n").unwrap(), "2.0");
    }

    #[test]
    fn test_sniff_tolerates_leading_whitespace() {
        assert_eq!(sniff_pdf_version(b"\r\n %PDF-1.4\n").unwrap(), "1.4");
    }

    #[test]
    fn test_sniff_rejects_html() {
        let result = sniff_pdf_version(b"<!DOCTYPE html><html></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_rejects_truncated_header() {
        assert!(matches!(sniff_pdf_version(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_pdf_version(b"%PDF-1"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_pdf_version(b""), Err(Error::UnknownFormat)));
    }
}
