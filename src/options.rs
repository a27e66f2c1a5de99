//! Narration options and configuration.

use std::ops::RangeInclusive;

use crate::model::{Gender, Locale, SpeechRate};

/// Default minimum number of characters for a page's embedded text to be
/// trusted without OCR.
pub const DEFAULT_OCR_THRESHOLD: usize = 10;

/// Default inward offset of the column split from the page midpoint.
pub const DEFAULT_GUTTER_MARGIN: f32 = 20.0;

/// Default number of characters handed to the language detector.
pub const DEFAULT_SAMPLE_LEN: usize = 1000;

/// Options for turning a document into narrated audio.
#[derive(Debug, Clone)]
pub struct NarrateOptions {
    /// Pages whose trimmed text is shorter than this are treated as scans
    pub ocr_threshold: usize,

    /// Inward offset of the column split, in page units
    pub gutter_margin: f32,

    /// Column reading order
    pub reading_order: ReadingOrder,

    /// Characters of document text used for language detection
    pub sample_len: usize,

    /// Locale used when the detected language is not supported
    pub default_locale: Locale,

    /// Forced locale; skips detection when set
    pub locale: Option<Locale>,

    /// Voice gender
    pub gender: Gender,

    /// Speaking-rate adjustment
    pub rate: SpeechRate,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Which pages to narrate
    pub pages: PageSelection,
}

impl NarrateOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR fallback threshold.
    pub fn with_ocr_threshold(mut self, chars: usize) -> Self {
        self.ocr_threshold = chars;
        self
    }

    /// Set the gutter margin.
    pub fn with_gutter_margin(mut self, margin: f32) -> Self {
        self.gutter_margin = margin;
        self
    }

    /// Set the column reading order.
    pub fn with_reading_order(mut self, order: ReadingOrder) -> Self {
        self.reading_order = order;
        self
    }

    /// Set the detection sample length.
    pub fn with_sample_len(mut self, chars: usize) -> Self {
        self.sample_len = chars;
        self
    }

    /// Set the fallback locale.
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Force a locale instead of detecting one.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Set the voice gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Set the speaking rate.
    pub fn with_rate(mut self, rate: SpeechRate) -> Self {
        self.rate = rate;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for NarrateOptions {
    fn default() -> Self {
        Self {
            ocr_threshold: DEFAULT_OCR_THRESHOLD,
            gutter_margin: DEFAULT_GUTTER_MARGIN,
            reading_order: ReadingOrder::RightToLeft,
            sample_len: DEFAULT_SAMPLE_LEN,
            default_locale: Locale::English,
            locale: None,
            gender: Gender::Female,
            rate: SpeechRate::default(),
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// How columns on a page are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingOrder {
    /// Two columns, right column first (bidirectional documents)
    #[default]
    RightToLeft,
    /// Two columns, left column first
    LeftToRight,
    /// One column, top to bottom
    SingleColumn,
}

impl ReadingOrder {
    /// Natural column order for a locale's script.
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Hebrew => ReadingOrder::RightToLeft,
            Locale::English => ReadingOrder::LeftToRight,
        }
    }
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Page numbers selected from a document of `page_count` pages, ascending.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        (1..=page_count).filter(|p| self.includes(*p)).collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                if start > end {
                    return Err(format!("Empty page range: {}", s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                pages.extend(start..=end);
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                pages.push(p);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrate_options_builder() {
        let options = NarrateOptions::new()
            .with_ocr_threshold(15)
            .with_gutter_margin(12.5)
            .with_reading_order(ReadingOrder::SingleColumn)
            .with_locale(Locale::Hebrew)
            .with_gender(Gender::Male)
            .sequential();

        assert_eq!(options.ocr_threshold, 15);
        assert_eq!(options.gutter_margin, 12.5);
        assert_eq!(options.reading_order, ReadingOrder::SingleColumn);
        assert_eq!(options.locale, Some(Locale::Hebrew));
        assert_eq!(options.gender, Gender::Male);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = NarrateOptions::default();
        assert_eq!(options.ocr_threshold, DEFAULT_OCR_THRESHOLD);
        assert_eq!(options.gutter_margin, 20.0);
        assert_eq!(options.reading_order, ReadingOrder::RightToLeft);
        assert_eq!(options.default_locale, Locale::English);
        assert_eq!(options.rate.as_str(), "+0%");
        assert!(options.parallel);
        assert!(options.locale.is_none());
    }

    #[test]
    fn test_reading_order_for_locale() {
        assert_eq!(
            ReadingOrder::for_locale(Locale::Hebrew),
            ReadingOrder::RightToLeft
        );
        assert_eq!(
            ReadingOrder::for_locale(Locale::English),
            ReadingOrder::LeftToRight
        );
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
        assert_eq!(pages.resolve(4), vec![1, 3]);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("5,1,3-4,3").unwrap(),
            PageSelection::Pages(vec![1, 3, 4, 5])
        );
        assert!(PageSelection::parse("9-2").is_err());
        assert!(PageSelection::parse("one").is_err());
    }
}
