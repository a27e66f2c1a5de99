//! Page-level types.

use super::PositionedFragment;
use serde::{Deserialize, Serialize};

/// A single page as seen by the reconstruction pipeline.
///
/// Pages are transient: built from a source, reconstructed into one
/// [`PageText`], then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text fragments in extraction order
    pub fragments: Vec<PositionedFragment>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            fragments: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Add a fragment to the page.
    pub fn push(&mut self, fragment: PositionedFragment) {
        self.fragments.push(fragment);
    }

    /// Builder-style fragment list.
    pub fn with_fragments(mut self, fragments: Vec<PositionedFragment>) -> Self {
        self.fragments = fragments;
        self
    }

    /// Check if the page has no fragments at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}

/// Where a page's reading-order text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// Embedded text, trusted as extracted
    Digital,
    /// Recognized from a rasterized image of the page
    Ocr,
    /// Nothing recoverable
    Empty,
}

/// Reading-order text of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,
    /// Fragments joined in reading order
    pub text: String,
    /// Provenance of `text`
    pub origin: TextOrigin,
}

impl PageText {
    /// Create page text, marking it [`TextOrigin::Empty`] when blank.
    pub fn new(number: u32, text: String, origin: TextOrigin) -> Self {
        let origin = if text.trim().is_empty() {
            TextOrigin::Empty
        } else {
            origin
        };
        Self {
            number,
            text,
            origin,
        }
    }

    /// An empty page.
    pub fn empty(number: u32) -> Self {
        Self {
            number,
            text: String::new(),
            origin: TextOrigin::Empty,
        }
    }

    /// Check if the page contributed no text.
    pub fn is_empty(&self) -> bool {
        self.origin == TextOrigin::Empty
    }
}
