//! Joining page texts into one document.

use crate::model::{DocumentText, PageText};

/// Concatenates page texts in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Space-join `pages` in the order given.
    ///
    /// Pages are never reordered; callers pass them sorted by number. When
    /// no page carries text the result is the empty string, so callers can
    /// test [`DocumentText::is_empty`] before synthesizing.
    pub fn assemble(&self, pages: Vec<PageText>) -> DocumentText {
        let text = pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let text = if text.trim().is_empty() {
            String::new()
        } else {
            text
        };
        log::debug!("Assembled {} pages into {} chars", pages.len(), text.chars().count());
        DocumentText::new(text, pages)
    }
}
