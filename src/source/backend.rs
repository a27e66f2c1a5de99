//! Document source abstraction.
//!
//! The pipeline only needs three things from a paginated document: how many
//! pages it has, the embedded text of a page with positions, and a pixel
//! image of a page for OCR. Concrete PDF libraries stay behind this trait.

use crate::error::{Error, Result};
use crate::model::Page;

/// A rendered page image handed to OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// PNG-encoded pixels
    pub png: Vec<u8>,
}

impl RasterImage {
    /// Wrap PNG bytes, reading the dimensions from the IHDR chunk.
    pub fn from_png(png: Vec<u8>) -> Result<Self> {
        const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
        if png.len() < 24 || !png.starts_with(SIGNATURE) || &png[12..16] != b"IHDR" {
            return Err(Error::Rasterize("output is not a PNG image".to_string()));
        }
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        Ok(Self { width, height, png })
    }
}

/// Access to a paginated document.
///
/// Implementations must be shareable across threads: pages may be
/// processed in parallel.
pub trait DocumentSource: Send + Sync {
    /// Total number of pages.
    fn page_count(&self) -> u32;

    /// Embedded text of a page with positions; no OCR.
    ///
    /// A page without embedded text yields an empty fragment list, not an
    /// error.
    fn page(&self, number: u32) -> Result<Page>;

    /// Render a page to pixels at its native resolution.
    fn rasterize(&self, number: u32) -> Result<RasterImage>;
}

/// Renders pages of a PDF byte stream to images.
pub trait PageRasterizer: Send + Sync {
    /// Render page `number` (1-indexed) of `pdf`.
    fn rasterize(&self, pdf: &[u8], number: u32) -> Result<RasterImage>;
}
