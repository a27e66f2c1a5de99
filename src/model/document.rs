//! Document-level types.

use super::{PageText, TextOrigin};
use serde::{Deserialize, Serialize};

/// The whole document as one stream of reading-order text.
///
/// Built by [`DocumentAssembler`](crate::convert::DocumentAssembler) for a
/// single conversion and never shared across requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentText {
    /// All page texts joined in page order
    pub text: String,

    /// Per-page texts the document was assembled from
    pub pages: Vec<PageText>,
}

impl DocumentText {
    /// Create document text from its joined form and the pages behind it.
    pub fn new(text: String, pages: Vec<PageText>) -> Self {
        Self { text, pages }
    }

    /// Check if the document carries no speakable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Prefix of at most `max_chars` characters, cut on a char boundary.
    pub fn sample(&self, max_chars: usize) -> &str {
        char_prefix(&self.text, max_chars)
    }

    /// Summarize how each page's text was obtained.
    pub fn stats(&self) -> ExtractionStats {
        let mut stats = ExtractionStats::new();
        for page in &self.pages {
            stats.add_page(page.origin);
        }
        stats.count_text(&self.text);
        stats
    }
}

/// Statistics collected while extracting document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Total number of pages processed
    pub page_count: u32,

    /// Pages whose embedded text was used
    pub digital_pages: u32,

    /// Pages recovered through OCR
    pub ocr_pages: u32,

    /// Pages that contributed no text
    pub empty_pages: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,
}

impl ExtractionStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one page of the given origin.
    pub fn add_page(&mut self, origin: TextOrigin) {
        self.page_count += 1;
        match origin {
            TextOrigin::Digital => self.digital_pages += 1,
            TextOrigin::Ocr => self.ocr_pages += 1,
            TextOrigin::Empty => self.empty_pages += 1,
        }
    }

    /// Count characters and words in text.
    pub fn count_text(&mut self, text: &str) {
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
        self.word_count += text.split_whitespace().count() as u32;
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub(crate) fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
