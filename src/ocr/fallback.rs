//! Deciding when a page needs OCR.

use crate::options::DEFAULT_OCR_THRESHOLD;

/// Minimum-character policy for trusting embedded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrFallback {
    /// Trimmed character count below which a page is treated as a scan
    pub min_chars: usize,
}

impl OcrFallback {
    /// Policy with the given threshold.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// Whether reconstructed digital text is too short to trust.
    ///
    /// Counts characters, not bytes, after trimming surrounding whitespace.
    /// Text of exactly `min_chars` characters is trusted.
    pub fn needs_ocr(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_chars
    }
}

impl Default for OcrFallback {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_THRESHOLD)
    }
}
