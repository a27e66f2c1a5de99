//! Per-page text extraction with OCR fallback.

use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::layout::{ColumnLayout, ColumnReconstructor, ReadingOrderPolicy};
use crate::model::{DocumentText, PageText, TextOrigin};
use crate::ocr::{OcrFallback, OcrService};
use crate::options::{NarrateOptions, PageSelection};
use crate::source::DocumentSource;

use super::DocumentAssembler;

/// Produces reading-order text for the pages of a document.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    reconstructor: ColumnReconstructor,
    fallback: OcrFallback,
    ocr: Option<Arc<OcrService>>,
    pages: PageSelection,
    parallel: bool,
}

impl TextExtractor {
    /// Extractor configured from narration options, without OCR.
    pub fn from_options(options: &NarrateOptions) -> Self {
        let layout = ColumnLayout::from_order(options.reading_order, options.gutter_margin);
        Self {
            reconstructor: ColumnReconstructor::new(Arc::new(layout)),
            fallback: OcrFallback::new(options.ocr_threshold),
            ocr: None,
            pages: options.pages.clone(),
            parallel: options.parallel,
        }
    }

    /// Recover short pages through `ocr`.
    pub fn with_ocr(mut self, ocr: Option<Arc<OcrService>>) -> Self {
        self.ocr = ocr;
        self
    }

    /// Replace the reading-order policy.
    pub fn with_policy(mut self, policy: Arc<dyn ReadingOrderPolicy>) -> Self {
        self.reconstructor = ColumnReconstructor::new(policy);
        self
    }

    /// Reading-order text of the selected pages.
    ///
    /// Page failures are logged and leave that page empty. Pages come back
    /// in page order whether or not they were processed in parallel.
    pub fn extract(&self, source: &dyn DocumentSource) -> Result<DocumentText> {
        let numbers = self.pages.resolve(source.page_count());
        log::info!(
            "Extracting {} of {} pages ({})",
            numbers.len(),
            source.page_count(),
            self.reconstructor.policy().name()
        );

        let pages: Vec<PageText> = if self.parallel {
            numbers
                .par_iter()
                .map(|&n| self.page_text(source, n))
                .collect()
        } else {
            numbers.iter().map(|&n| self.page_text(source, n)).collect()
        };

        Ok(DocumentAssembler::new().assemble(pages))
    }

    /// Reading-order text of one page.
    pub fn page_text(&self, source: &dyn DocumentSource, number: u32) -> PageText {
        let digital = match source.page(number) {
            Ok(page) => self.reconstructor.reconstruct(&page.fragments, page.width),
            Err(e) => {
                log::warn!("Page {}: text extraction failed: {}", number, e);
                String::new()
            }
        };

        if !self.fallback.needs_ocr(&digital) {
            return PageText::new(number, digital, TextOrigin::Digital);
        }
        let Some(ocr) = &self.ocr else {
            return PageText::new(number, digital, TextOrigin::Digital);
        };

        log::debug!(
            "Page {}: {} chars of embedded text, trying OCR",
            number,
            digital.trim().chars().count()
        );
        // Image width stands in for page width: OCR coordinates are pixels.
        let recognized = source.rasterize(number).and_then(|image| {
            let fragments = ocr.recognize(&image)?;
            Ok(self.reconstructor.reconstruct(&fragments, image.width as f32))
        });

        match recognized {
            Ok(text) if !text.trim().is_empty() => PageText::new(number, text, TextOrigin::Ocr),
            Ok(_) => {
                log::warn!("Page {}: OCR found no text", number);
                PageText::new(number, digital, TextOrigin::Digital)
            }
            Err(e) => {
                log::warn!("Page {}: OCR skipped: {}", number, e);
                PageText::new(number, digital, TextOrigin::Digital)
            }
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::from_options(&NarrateOptions::default())
    }
}
