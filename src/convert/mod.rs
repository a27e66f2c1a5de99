//! End-to-end narration: document in, MP3 out.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(all(feature = "async", feature = "lingua"))]
//! # async fn run() -> readaloud::Result<()> {
//! use std::sync::Arc;
//! use readaloud::{LinguaDetector, LopdfSource, Narrator, EdgeTtsCommand};
//!
//! let source = LopdfSource::open("paper.pdf")?;
//! let narrator = Narrator::new(
//!     Arc::new(LinguaDetector::new()),
//!     Arc::new(EdgeTtsCommand::default()),
//! );
//! let narration = narrator.narrate(&source, Some("paper")).await?;
//! std::fs::write(&narration.suggested_filename, narration.audio.as_bytes())?;
//! # Ok(())
//! # }
//! ```

mod assemble;
mod extract;

pub use assemble::DocumentAssembler;
pub use extract::TextExtractor;

use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::language::{LanguageDetector, LanguageResolution, LanguageResolver};
use crate::layout::ReadingOrderPolicy;
use crate::model::{AudioBuffer, DocumentText, ExtractionStats, Locale, VoiceProfile};
use crate::ocr::OcrService;
use crate::options::NarrateOptions;
use crate::source::DocumentSource;
use crate::speech::{SpeechService, VoiceSynthesizer};

/// MIME type of synthesized audio.
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// File name offered when the document has no title.
pub const DEFAULT_FILENAME: &str = "audiobook.mp3";

/// Result of narrating a document.
#[derive(Debug, Clone, Serialize)]
pub struct Narration {
    /// Language code reported by detection, or the forced locale's code
    pub detected_code: String,
    /// Locale the audio is spoken in
    pub locale: Locale,
    /// Voice used
    pub voice: VoiceProfile,
    /// MP3-encoded audio
    #[serde(skip)]
    pub audio: AudioBuffer,
    /// File name to offer for the audio
    pub suggested_filename: String,
    /// How page texts were obtained
    pub stats: ExtractionStats,
}

impl Narration {
    /// MIME type of [`Narration::audio`].
    pub fn mime_type(&self) -> &'static str {
        AUDIO_MIME_TYPE
    }
}

/// Runs the whole pipeline for one document at a time.
///
/// A narrator holds only shared, read-only services; every call builds its
/// own pages, text and audio buffer.
pub struct Narrator {
    detector: Arc<dyn LanguageDetector>,
    synthesizer: VoiceSynthesizer,
    ocr: Option<Arc<OcrService>>,
    policy: Option<Arc<dyn ReadingOrderPolicy>>,
    options: NarrateOptions,
}

impl Narrator {
    /// Narrator without OCR, using default options.
    pub fn new(detector: Arc<dyn LanguageDetector>, speech: Arc<dyn SpeechService>) -> Self {
        Self {
            detector,
            synthesizer: VoiceSynthesizer::new(speech),
            ocr: None,
            policy: None,
            options: NarrateOptions::default(),
        }
    }

    /// Recover scanned pages through `ocr`.
    pub fn with_ocr(mut self, ocr: Arc<OcrService>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: NarrateOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom reading-order policy instead of the one named in the
    /// options.
    pub fn with_policy(mut self, policy: Arc<dyn ReadingOrderPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Current options.
    pub fn options(&self) -> &NarrateOptions {
        &self.options
    }

    /// Page extractor for the current configuration.
    pub fn extractor(&self) -> TextExtractor {
        let extractor = TextExtractor::from_options(&self.options).with_ocr(self.ocr.clone());
        match &self.policy {
            Some(policy) => extractor.with_policy(policy.clone()),
            None => extractor,
        }
    }

    /// Reading-order text of the selected pages, with OCR for scanned ones.
    pub fn extract(&self, source: &dyn DocumentSource) -> Result<DocumentText> {
        self.extractor().extract(source)
    }

    /// Pick the locale to speak `document` in.
    ///
    /// A locale forced through the options skips detection.
    pub fn resolve_language(&self, document: &DocumentText) -> Result<LanguageResolution> {
        if let Some(locale) = self.options.locale {
            return Ok(LanguageResolution {
                detected_code: locale.code().to_string(),
                locale,
                fallback: false,
            });
        }
        LanguageResolver::new(self.options.sample_len, self.options.default_locale)
            .resolve_document(self.detector.as_ref(), document)
    }

    /// Speak `text` in `locale` with the configured gender and rate.
    pub async fn synthesize(&self, text: &str, locale: Locale) -> Result<AudioBuffer> {
        let voice = VoiceProfile::new(locale, self.options.gender);
        self.synthesizer
            .synthesize(text, voice, &self.options.rate)
            .await
    }

    /// Extract, detect, and synthesize a whole document.
    ///
    /// Fails with [`Error::ExtractionEmpty`] before detection when no page
    /// yields text.
    pub async fn narrate(
        &self,
        source: &dyn DocumentSource,
        title: Option<&str>,
    ) -> Result<Narration> {
        let document = self.extract(source)?;
        if document.is_empty() {
            return Err(Error::ExtractionEmpty);
        }

        let resolution = self.resolve_language(&document)?;
        let voice = VoiceProfile::new(resolution.locale, self.options.gender);
        let audio = self.synthesize(document.as_str(), resolution.locale).await?;

        Ok(Narration {
            detected_code: resolution.detected_code,
            locale: resolution.locale,
            voice,
            audio,
            suggested_filename: suggested_filename(title),
            stats: document.stats(),
        })
    }
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("ocr", &self.ocr)
            .field("policy", &self.policy)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// `<title>.mp3` with path separators and control characters removed.
pub fn suggested_filename(title: Option<&str>) -> String {
    let stem: String = title
        .unwrap_or_default()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.');
    if stem.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{}.mp3", stem)
    }
}
