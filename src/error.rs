//! Error types for readaloud.

use std::io;
use thiserror::Error;

/// Result type alias for readaloud operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while turning a document into audio.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A page could not be turned into a pixel image.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// The OCR engine could not be initialized for any locale set.
    #[error("OCR initialization failed: {0}")]
    OcrInit(String),

    /// The OCR engine failed while recognizing a page.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// No text could be recovered from the document.
    #[error("No extractable text found in document")]
    ExtractionEmpty,

    /// The language detector could not classify the sample.
    #[error("Language detection failed: {0}")]
    DetectionFailure(String),

    /// The speech service failed or produced no audio.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Speed adjustment is not a signed percentage.
    #[error("Invalid speech rate {0:?}: expected a signed percentage such as +10% or -5%")]
    InvalidRate(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller can reasonably continue, retry, or fall back.
    ///
    /// Detection failures may be retried with another sample or replaced by a
    /// configured locale; OCR and rasterization failures only cost one page.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DetectionFailure(_) | Error::OcrInit(_) | Error::Ocr(_) | Error::Rasterize(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExtractionEmpty;
        assert_eq!(err.to_string(), "No extractable text found in document");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::InvalidRate("fast".into());
        assert!(err.to_string().contains("\"fast\""));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::DetectionFailure("too short".into()).is_recoverable());
        assert!(Error::OcrInit("no traineddata".into()).is_recoverable());
        assert!(!Error::Synthesis("timeout".into()).is_recoverable());
        assert!(!Error::ExtractionEmpty.is_recoverable());
    }
}
