//! Cheap PDF sniffing, run before a byte stream is handed to the parser.

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept a header anywhere in the first kilobyte of the file.
const HEADER_WINDOW: usize = 1024;

/// Header information found at the start of a PDF byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Declared version, e.g. "1.7"
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Locate and validate the PDF header in `data`.
///
/// Returns [`Error::UnknownFormat`] when no `%PDF-x.y` marker appears in the
/// first kilobyte.
pub fn sniff_pdf(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_start = offset + PDF_MAGIC.len();
    let version = data
        .get(version_start..version_start + 3)
        .ok_or(Error::UnknownFormat)?;

    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(PdfHeader {
            version: format!("{}.{}", *major as char, *minor as char),
            offset,
        }),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if bytes look like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_pdf(data).is_ok()
}
