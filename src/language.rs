//! Language detection and locale resolution.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{char_prefix, DocumentText, Locale};
use crate::options::DEFAULT_SAMPLE_LEN;

/// Detects the language of a text sample.
pub trait LanguageDetector: Send + Sync {
    /// ISO language code of `text`.
    ///
    /// Implementations return [`Error::DetectionFailure`] when the sample
    /// cannot be classified.
    fn detect(&self, text: &str) -> Result<String>;
}

/// Outcome of resolving a sample to a supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageResolution {
    /// Code as reported by the detector
    pub detected_code: String,
    /// Supported locale to speak in
    pub locale: Locale,
    /// Whether the detected code was unsupported and the default was used
    pub fallback: bool,
}

/// Maps a detector's verdict onto one of the supported locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageResolver {
    /// Characters taken from the start of the document
    pub sample_len: usize,
    /// Locale used for unsupported languages
    pub default_locale: Locale,
}

impl LanguageResolver {
    /// Resolver with explicit sample length and default.
    pub fn new(sample_len: usize, default_locale: Locale) -> Self {
        Self {
            sample_len,
            default_locale,
        }
    }

    /// Detect the language of the leading sample of `text`.
    pub fn resolve(&self, detector: &dyn LanguageDetector, text: &str) -> Result<LanguageResolution> {
        let sample = char_prefix(text, self.sample_len);
        if sample.trim().is_empty() {
            return Err(Error::DetectionFailure("sample is empty".to_string()));
        }

        let detected_code = detector.detect(sample).map_err(|e| match e {
            Error::DetectionFailure(_) => e,
            other => Error::DetectionFailure(other.to_string()),
        })?;
        Ok(self.resolve_code(detected_code))
    }

    /// Resolve a whole document.
    pub fn resolve_document(
        &self,
        detector: &dyn LanguageDetector,
        document: &DocumentText,
    ) -> Result<LanguageResolution> {
        self.resolve(detector, document.sample(self.sample_len))
    }

    /// Map an already detected code, defaulting when it is unsupported.
    pub fn resolve_code(&self, detected_code: String) -> LanguageResolution {
        match Locale::from_code(&detected_code) {
            Some(locale) => {
                log::info!("Detected language {} ({})", detected_code, locale.name());
                LanguageResolution {
                    detected_code,
                    locale,
                    fallback: false,
                }
            }
            None => {
                log::info!(
                    "Detected language {} is not supported; using {}",
                    detected_code,
                    self.default_locale.name()
                );
                LanguageResolution {
                    detected_code,
                    locale: self.default_locale,
                    fallback: true,
                }
            }
        }
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LEN, Locale::default())
    }
}

#[cfg(feature = "lingua")]
pub use self::lingua_detector::LinguaDetector;

#[cfg(feature = "lingua")]
mod lingua_detector {
    use lingua::{Language, LanguageDetectorBuilder};

    use super::LanguageDetector;
    use crate::error::{Error, Result};

    /// Statistical detector over the languages documents are likely to mix.
    pub struct LinguaDetector {
        inner: lingua::LanguageDetector,
    }

    impl LinguaDetector {
        /// Build the detector; loads language models eagerly.
        pub fn new() -> Self {
            let languages = [
                Language::English,
                Language::Hebrew,
                Language::Arabic,
                Language::French,
                Language::German,
                Language::Spanish,
                Language::Russian,
            ];
            Self {
                inner: LanguageDetectorBuilder::from_languages(&languages).build(),
            }
        }
    }

    impl Default for LinguaDetector {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LanguageDetector for LinguaDetector {
        fn detect(&self, text: &str) -> Result<String> {
            self.inner
                .detect_language_of(text)
                .map(|language| language.iso_code_639_1().to_string())
                .ok_or_else(|| Error::DetectionFailure("no reliable language match".to_string()))
        }
    }
}
